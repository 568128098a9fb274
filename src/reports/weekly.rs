//! Weekly Report
//!
//! Order totals per weekday across the Sunday-to-Saturday week containing a
//! given date.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use super::{csv_error, csv_writer, serialize_euros};
use crate::error::PastificioResult;
use crate::models::{Money, Order};

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Totals of one weekday
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdaySummary {
    /// 1 = Sunday ... 7 = Saturday
    #[serde(rename = "giornoSettimana")]
    pub day_of_week: u32,
    #[serde(rename = "totaleOrdini")]
    pub total_orders: usize,
    #[serde(rename = "totaleIncasso", serialize_with = "serialize_euros")]
    pub total_revenue: Money,
}

impl WeekdaySummary {
    pub fn weekday_name(&self) -> &'static str {
        WEEKDAY_NAMES[(self.day_of_week as usize - 1) % 7]
    }
}

/// Weekly Report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyReport {
    #[serde(rename = "inizioSettimana")]
    pub week_start: NaiveDate,
    #[serde(rename = "fineSettimana")]
    pub week_end: NaiveDate,
    /// Only weekdays with orders, Sunday first
    #[serde(rename = "giorni")]
    pub days: Vec<WeekdaySummary>,
}

impl WeeklyReport {
    /// Generate the report for the week containing `date`
    pub fn generate(orders: &[Order], date: NaiveDate) -> Self {
        let week_start = date - Duration::days(i64::from(date.weekday().num_days_from_sunday()));
        let week_end = week_start + Duration::days(6);

        let mut by_day: BTreeMap<u32, (usize, Money)> = BTreeMap::new();
        for order in orders
            .iter()
            .filter(|o| o.pickup_date >= week_start && o.pickup_date <= week_end)
        {
            let entry = by_day
                .entry(order.pickup_date.weekday().number_from_sunday())
                .or_insert((0, Money::zero()));
            entry.0 += 1;
            entry.1 += order.total();
        }

        Self {
            week_start,
            week_end,
            days: by_day
                .into_iter()
                .map(|(day_of_week, (total_orders, total_revenue))| WeekdaySummary {
                    day_of_week,
                    total_orders,
                    total_revenue,
                })
                .collect(),
        }
    }

    pub fn total_orders(&self) -> usize {
        self.days.iter().map(|d| d.total_orders).sum()
    }

    pub fn total_revenue(&self) -> Money {
        self.days.iter().map(|d| d.total_revenue).sum()
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Weekly Report: {} to {}\n",
            self.week_start, self.week_end
        ));
        output.push_str(&"=".repeat(40));
        output.push('\n');
        output.push_str(&format!("{:<16} {:>8} {:>14}\n", "Day", "Orders", "Revenue"));
        output.push_str(&"-".repeat(40));
        output.push('\n');

        for day in &self.days {
            output.push_str(&format!(
                "{:<16} {:>8} {:>14}\n",
                day.weekday_name(),
                day.total_orders,
                day.total_revenue.to_string()
            ));
        }

        output.push_str(&"-".repeat(40));
        output.push('\n');
        output.push_str(&format!(
            "{:<16} {:>8} {:>14}\n",
            "TOTAL",
            self.total_orders(),
            self.total_revenue().to_string()
        ));

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> PastificioResult<()> {
        let mut csv = csv_writer(writer);
        csv.write_record(["Week Start", "Day Of Week", "Day", "Orders", "Revenue"])
            .map_err(csv_error)?;
        for day in &self.days {
            csv.write_record([
                self.week_start.to_string(),
                day.day_of_week.to_string(),
                day.weekday_name().to_string(),
                day.total_orders.to_string(),
                format!("{:.2}", day.total_revenue.as_f64()),
            ])
            .map_err(csv_error)?;
        }
        csv.flush().map_err(csv_error)?;
        Ok(())
    }
}
