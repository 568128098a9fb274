//! Daily Report
//!
//! Totals for the orders picked up on one day.

use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use super::{csv_error, csv_writer, percentage, serialize_euros};
use crate::error::PastificioResult;
use crate::models::{Money, Order};

/// Daily Report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "totaleOrdini")]
    pub total_orders: usize,
    #[serde(rename = "totaleIncasso", serialize_with = "serialize_euros")]
    pub total_revenue: Money,
    #[serde(rename = "ordiniCompletati")]
    pub completed_orders: usize,
    #[serde(rename = "percentualeCompletamento")]
    pub completion_percentage: f64,
}

impl DailyReport {
    /// Generate the report for orders picked up on `date`
    pub fn generate(orders: &[Order], date: NaiveDate) -> Self {
        let day: Vec<&Order> = orders.iter().filter(|o| o.pickup_date == date).collect();
        let completed_orders = day.iter().filter(|o| o.is_completed()).count();

        Self {
            date,
            total_orders: day.len(),
            total_revenue: day.iter().map(|o| o.total()).sum(),
            completed_orders,
            completion_percentage: percentage(completed_orders, day.len()),
        }
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Daily Report: {}\n", self.date));
        output.push_str(&"=".repeat(40));
        output.push('\n');
        output.push_str(&format!("{:<24} {:>14}\n", "Orders", self.total_orders));
        output.push_str(&format!("{:<24} {:>14}\n", "Revenue", self.total_revenue.to_string()));
        output.push_str(&format!("{:<24} {:>14}\n", "Completed", self.completed_orders));
        output.push_str(&format!(
            "{:<24} {:>13.1}%\n",
            "Completion", self.completion_percentage
        ));

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> PastificioResult<()> {
        let mut csv = csv_writer(writer);
        csv.write_record(["Date", "Orders", "Revenue", "Completed", "Completion %"])
            .map_err(csv_error)?;
        csv.write_record([
            self.date.to_string(),
            self.total_orders.to_string(),
            format!("{:.2}", self.total_revenue.as_f64()),
            self.completed_orders.to_string(),
            format!("{:.2}", self.completion_percentage),
        ])
        .map_err(csv_error)?;
        csv.flush().map_err(csv_error)?;
        Ok(())
    }
}
