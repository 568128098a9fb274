//! Top Products Report
//!
//! Best-selling products over a trailing window of pickup days. The window
//! has no upper bound: orders booked for a later pickup count as sold.

use std::collections::HashMap;
use std::io::Write;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::{csv_error, csv_writer, serialize_euros};
use crate::error::{PastificioError, PastificioResult};
use crate::models::{Money, Order, ProductCategory};

/// Window used when none is given
pub const DEFAULT_TOP_PRODUCTS_DAYS: u32 = 30;

/// Sales of one product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    #[serde(rename = "prodotto")]
    pub product: String,
    #[serde(rename = "categoria")]
    pub category: ProductCategory,
    #[serde(rename = "quantitaTotale")]
    pub total_quantity: f64,
    #[serde(rename = "incassoTotale", serialize_with = "serialize_euros")]
    pub total_revenue: Money,
}

/// Top Products Report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProductsReport {
    #[serde(rename = "dataInizio")]
    pub start_date: NaiveDate,
    /// Day the window was computed on
    #[serde(rename = "dataRiferimento")]
    pub as_of: NaiveDate,
    #[serde(rename = "periodo")]
    pub days: u32,
    /// Most sold first
    #[serde(rename = "prodotti")]
    pub products: Vec<ProductSummary>,
}

impl TopProductsReport {
    /// Generate the report for pickups from `days` days before `today` on
    pub fn generate(orders: &[Order], today: NaiveDate, days: u32) -> PastificioResult<Self> {
        if days == 0 {
            return Err(PastificioError::Validation(
                "Top products window must be at least one day".into(),
            ));
        }
        let start_date = today - Duration::days(i64::from(days));

        let mut groups: HashMap<(String, ProductCategory), (f64, Money)> = HashMap::new();
        for order in orders
            .iter()
            .filter(|o| o.pickup_date >= start_date)
        {
            for item in &order.items {
                let entry = groups
                    .entry((item.product.clone(), item.category))
                    .or_insert((0.0, Money::zero()));
                entry.0 += item.quantity;
                entry.1 += item.line_total();
            }
        }

        let mut products: Vec<ProductSummary> = groups
            .into_iter()
            .map(|((product, category), (total_quantity, total_revenue))| ProductSummary {
                product,
                category,
                total_quantity,
                total_revenue,
            })
            .collect();

        products.sort_by(|a, b| {
            b.total_quantity
                .total_cmp(&a.total_quantity)
                .then_with(|| a.product.cmp(&b.product))
                .then_with(|| a.category.cmp(&b.category))
        });

        Ok(Self {
            start_date,
            as_of: today,
            days,
            products,
        })
    }

    /// The `limit` best-selling products
    pub fn top(&self, limit: usize) -> &[ProductSummary] {
        &self.products[..limit.min(self.products.len())]
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Top Products: since {} ({} days before {})\n",
            self.start_date, self.days, self.as_of
        ));
        output.push_str(&"=".repeat(64));
        output.push('\n');
        output.push_str(&format!(
            "{:<4} {:<28} {:<10} {:>8} {:>10}\n",
            "#", "Product", "Category", "Qty", "Revenue"
        ));
        output.push_str(&"-".repeat(64));
        output.push('\n');

        for (rank, product) in self.products.iter().enumerate() {
            output.push_str(&format!(
                "{:<4} {:<28} {:<10} {:>8} {:>10}\n",
                rank + 1,
                product.product,
                product.category.as_str(),
                product.total_quantity,
                product.total_revenue.to_string()
            ));
        }

        if self.products.is_empty() {
            output.push_str("No sales in this period.\n");
        }

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> PastificioResult<()> {
        let mut csv = csv_writer(writer);
        csv.write_record(["Rank", "Product", "Category", "Quantity", "Revenue"])
            .map_err(csv_error)?;
        for (rank, product) in self.products.iter().enumerate() {
            csv.write_record([
                (rank + 1).to_string(),
                product.product.clone(),
                product.category.to_string(),
                product.total_quantity.to_string(),
                format!("{:.2}", product.total_revenue.as_f64()),
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

    #[test]
    fn test_culurgiones_grouped() {
        let today = date(2026, 10, 18);
        let orders = vec![
            create_test_order(
                date(2026, 10, 1),
                &[(ProductCategory::Pasta, "Culurgiones", 2.0, 1500)],
                OrderStatus::Delivered,
            ),
            create_test_order(
                date(2026, 10, 17),
                &[(ProductCategory::Pasta, "Culurgiones", 3.0, 1500)],
                OrderStatus::New,
            ),
        ];

        let report = TopProductsReport::generate(&orders, today, 30).unwrap();
        assert_eq!(report.products.len(), 1);
        let top = &report.products[0];
        assert_eq!(top.product, "Culurgiones");
        assert_eq!(top.total_quantity, 5.0);
        assert_eq!(top.total_revenue, Money::from_euros(75));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["prodotti"][0]["quantitaTotale"], 5.0);
        assert_eq!(json["prodotti"][0]["incassoTotale"], 75.0);
    }

    #[test]
    fn test_window_bounds() {
        let today = date(2026, 10, 18);
        let line = [(ProductCategory::Dolci, "Pardulas", 1.0, 100)];
        let orders = vec![
            create_test_order(date(2026, 10, 11), &line, OrderStatus::New), // first day in window
            create_test_order(date(2026, 10, 10), &line, OrderStatus::New), // too old
            create_test_order(date(2026, 10, 19), &line, OrderStatus::New), // future pickup
        ];

        let report = TopProductsReport::generate(&orders, today, 7).unwrap();
        assert_eq!(report.start_date, date(2026, 10, 11));
        assert_eq!(report.products[0].total_quantity, 2.0);
    }

    #[test]
    fn test_orders_booked_ahead_count() {
        let today = date(2026, 10, 18);
        let orders = vec![
            create_test_order(
                date(2026, 10, 30),
                &[(ProductCategory::Panadas, "Panada di agnello", 3.0, 2200)],
                OrderStatus::New,
            ),
            create_test_order(
                today,
                &[(ProductCategory::Pasta, "Fregola", 1.0, 600)],
                OrderStatus::Completed,
            ),
        ];

        let report = TopProductsReport::generate(&orders, today, 30).unwrap();
        assert_eq!(report.products.len(), 2);
        assert_eq!(report.products[0].product, "Panada di agnello");
        assert_eq!(report.products[0].total_revenue, Money::from_euros(66));
    }

    #[test]
    fn test_sorted_by_quantity_then_name() {
        let today = date(2026, 10, 18);
        let orders = vec![create_test_order(
            today,
            &[
                (ProductCategory::Dolci, "Seadas", 2.0, 400),
                (ProductCategory::Pasta, "Malloreddus", 6.0, 900),
                (ProductCategory::Dolci, "Amaretti", 2.0, 300),
                (ProductCategory::Panadas, "Panada di anguille", 1.0, 2500),
            ],
            OrderStatus::New,
        )];

        let report = TopProductsReport::generate(&orders, today, 30).unwrap();
        let names: Vec<&str> = report.products.iter().map(|p| p.product.as_str()).collect();
        assert_eq!(
            names,
            vec!["Malloreddus", "Amaretti", "Seadas", "Panada di anguille"]
        );
        assert_eq!(report.top(2).len(), 2);
        assert_eq!(report.top(10).len(), 4);
    }

    #[test]
    fn test_zero_days_rejected() {
        let err = TopProductsReport::generate(&[], date(2026, 10, 18), 0).unwrap_err();
        assert!(err.is_validation());
    }
}
