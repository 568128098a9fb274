//! Monthly Report
//!
//! Per-day breakdown of one month, the month summary and the trend against
//! the previous month.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::{csv_error, csv_writer, serialize_euros};
use crate::error::{PastificioError, PastificioResult};
use crate::models::{Money, Order, ProductCategory};

/// Quantity of one product sold on a day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductQuantity {
    #[serde(rename = "prodotto")]
    pub product: String,
    #[serde(rename = "categoria")]
    pub category: ProductCategory,
    #[serde(rename = "quantita")]
    pub quantity: f64,
}

/// Totals of one day of the month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    #[serde(rename = "giorno")]
    pub day: u32,
    #[serde(rename = "totaleOrdini")]
    pub total_orders: usize,
    #[serde(rename = "totaleIncasso", serialize_with = "serialize_euros")]
    pub total_revenue: Money,
    /// Products sold that day, by product name
    #[serde(rename = "prodottiVenduti")]
    pub products_sold: Vec<ProductQuantity>,
}

/// Percentage change against the previous month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    #[serde(rename = "ordini")]
    pub orders: f64,
    #[serde(rename = "incasso")]
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    #[serde(rename = "totaleOrdini")]
    pub total_orders: usize,
    #[serde(rename = "totaleIncasso", serialize_with = "serialize_euros")]
    pub total_revenue: Money,
    pub trend: Trend,
}

/// Monthly Report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    #[serde(rename = "anno")]
    pub year: i32,
    #[serde(rename = "mese")]
    pub month: u32,
    #[serde(rename = "datiGiornalieri")]
    pub days: Vec<DaySummary>,
    #[serde(rename = "riepilogoMese")]
    pub summary: MonthSummary,
}

/// `(current / previous - 1) * 100`, with a zero previous value counted as 1
fn trend_percentage(current: f64, previous: f64) -> f64 {
    let previous = if previous == 0.0 { 1.0 } else { previous };
    (current / previous - 1.0) * 100.0
}

fn in_month(order: &Order, year: i32, month: u32) -> bool {
    order.pickup_date.year() == year && order.pickup_date.month() == month
}

impl MonthlyReport {
    /// Generate the report for `month` (1-12) of `year`
    pub fn generate(orders: &[Order], year: i32, month: u32) -> PastificioResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(PastificioError::Validation(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            PastificioError::Validation(format!("Invalid month {}-{:02}", year, month))
        })?;
        let previous = first.pred_opt().ok_or_else(|| {
            PastificioError::Validation(format!("No month before {}-{:02}", year, month))
        })?;

        let mut by_day: BTreeMap<u32, (usize, Money, BTreeMap<(String, ProductCategory), f64>)> =
            BTreeMap::new();
        for order in orders.iter().filter(|o| in_month(o, year, month)) {
            let entry = by_day
                .entry(order.pickup_date.day())
                .or_insert_with(|| (0, Money::zero(), BTreeMap::new()));
            entry.0 += 1;
            entry.1 += order.total();
            for item in &order.items {
                *entry
                    .2
                    .entry((item.product.clone(), item.category))
                    .or_insert(0.0) += item.quantity;
            }
        }

        let days: Vec<DaySummary> = by_day
            .into_iter()
            .map(|(day, (total_orders, total_revenue, products))| DaySummary {
                day,
                total_orders,
                total_revenue,
                products_sold: products
                    .into_iter()
                    .map(|((product, category), quantity)| ProductQuantity {
                        product,
                        category,
                        quantity,
                    })
                    .collect(),
            })
            .collect();

        let total_orders: usize = days.iter().map(|d| d.total_orders).sum();
        let total_revenue: Money = days.iter().map(|d| d.total_revenue).sum();

        let last_month: Vec<&Order> = orders
            .iter()
            .filter(|o| in_month(o, previous.year(), previous.month()))
            .collect();
        let last_revenue: Money = last_month.iter().map(|o| o.total()).sum();

        Ok(Self {
            year,
            month,
            days,
            summary: MonthSummary {
                total_orders,
                total_revenue,
                trend: Trend {
                    orders: trend_percentage(total_orders as f64, last_month.len() as f64),
                    revenue: trend_percentage(total_revenue.as_f64(), last_revenue.as_f64()),
                },
            },
        })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Monthly Report: {}-{:02}\n", self.year, self.month));
        output.push_str(&"=".repeat(48));
        output.push('\n');
        output.push_str(&format!(
            "{:<6} {:>8} {:>14} {:>16}\n",
            "Day", "Orders", "Revenue", "Items sold"
        ));
        output.push_str(&"-".repeat(48));
        output.push('\n');

        for day in &self.days {
            let items: f64 = day.products_sold.iter().map(|p| p.quantity).sum();
            output.push_str(&format!(
                "{:<6} {:>8} {:>14} {:>16}\n",
                day.day,
                day.total_orders,
                day.total_revenue.to_string(),
                items
            ));
        }

        output.push_str(&"-".repeat(48));
        output.push('\n');
        output.push_str(&format!(
            "{:<6} {:>8} {:>14}\n",
            "TOTAL",
            self.summary.total_orders,
            self.summary.total_revenue.to_string()
        ));
        output.push_str(&format!(
            "Trend vs previous month: orders {:+.1}%, revenue {:+.1}%\n",
            self.summary.trend.orders, self.summary.trend.revenue
        ));

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> PastificioResult<()> {
        let mut csv = csv_writer(writer);
        csv.write_record(["Year", "Month", "Day", "Orders", "Revenue", "Items Sold"])
            .map_err(csv_error)?;
        for day in &self.days {
            let items: f64 = day.products_sold.iter().map(|p| p.quantity).sum();
            csv.write_record([
                self.year.to_string(),
                self.month.to_string(),
                day.day.to_string(),
                day.total_orders.to_string(),
                format!("{:.2}", day.total_revenue.as_f64()),
                items.to_string(),
            ])
            .map_err(csv_error)?;
        }
        csv.flush().map_err(csv_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderStatus;
    use crate::reports::test_support::{create_test_order, date};

    fn order_on(day: NaiveDate, product: &str, quantity: f64, cents: i64) -> Order {
        create_test_order(
            day,
            &[(ProductCategory::Pasta, product, quantity, cents)],
            OrderStatus::Delivered,
        )
    }

    #[test]
    fn test_invalid_month() {
        assert!(MonthlyReport::generate(&[], 2026, 0).unwrap_err().is_validation());
        assert!(MonthlyReport::generate(&[], 2026, 13).is_err());
    }

    #[test]
    fn test_groups_by_day() {
        let orders = vec![
            order_on(date(2026, 10, 5), "Culurgiones", 2.0, 1500),
            order_on(date(2026, 10, 5), "Fregola", 1.0, 800),
            order_on(date(2026, 10, 1), "Culurgiones", 1.0, 1500),
            order_on(date(2026, 11, 1), "Culurgiones", 9.0, 1500),
        ];

        let report = MonthlyReport::generate(&orders, 2026, 10).unwrap();
        let days: Vec<u32> = report.days.iter().map(|d| d.day).collect();
        assert_eq!(days, vec![1, 5]);

        let fifth = &report.days[1];
        assert_eq!(fifth.total_orders, 2);
        assert_eq!(fifth.total_revenue, Money::from_euros(38));
        assert_eq!(fifth.products_sold.len(), 2);
        assert_eq!(fifth.products_sold[0].product, "Culurgiones");

        assert_eq!(report.summary.total_orders, 3);
        assert_eq!(report.summary.total_revenue, Money::from_euros(53));
    }

    #[test]
    fn test_trend_against_previous_month() {
        let orders = vec![
            order_on(date(2026, 9, 10), "Seadas", 2.0, 500),
            order_on(date(2026, 10, 10), "Seadas", 2.0, 500),
            order_on(date(2026, 10, 11), "Seadas", 2.0, 500),
        ];

        let report = MonthlyReport::generate(&orders, 2026, 10).unwrap();
        assert_eq!(report.summary.trend.orders, 100.0);
        assert_eq!(report.summary.trend.revenue, 100.0);
    }

    #[test]
    fn test_trend_with_empty_previous_month() {
        // January compares against December of the previous year
        let orders = vec![order_on(date(2026, 1, 3), "Seadas", 4.0, 500)];
        let report = MonthlyReport::generate(&orders, 2026, 1).unwrap();

        // Last month's zero totals count as 1
        assert_eq!(report.summary.trend.orders, 0.0);
        assert_eq!(report.summary.trend.revenue, 1900.0);
    }

    #[test]
    fn test_json_shape() {
        let report = MonthlyReport::generate(&[], 2026, 10).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["datiGiornalieri"].as_array().unwrap().is_empty());
        assert_eq!(json["riepilogoMese"]["totaleOrdini"], 0);
        assert_eq!(json["riepilogoMese"]["trend"]["ordini"], -100.0);
    }
}
