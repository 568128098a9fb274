//! Category breakdown of one pickup day

use std::collections::BTreeMap;
use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use super::{csv_error, csv_writer, serialize_euros};
use crate::error::PastificioResult;
use crate::models::{Money, Order, ProductCategory};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    #[serde(rename = "categoria")]
    pub category: ProductCategory,
    #[serde(rename = "quantitaTotale")]
    pub total_quantity: f64,
    #[serde(rename = "valoreTotale", serialize_with = "serialize_euros")]
    pub total_value: Money,
    /// Number of order lines in the category
    #[serde(rename = "numeroOrdini")]
    pub line_count: usize,
}

/// Category Report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryReport {
    #[serde(rename = "data")]
    pub date: NaiveDate,
    /// Highest value first
    #[serde(rename = "categorie")]
    pub categories: Vec<CategorySummary>,
}

impl CategoryReport {
    pub fn generate(orders: &[Order], date: NaiveDate) -> Self {
        let mut groups: BTreeMap<ProductCategory, (f64, Money, usize)> = BTreeMap::new();
        for item in orders
            .iter()
            .filter(|o| o.pickup_date == date)
            .flat_map(|o| &o.items)
        {
            let entry = groups
                .entry(item.category)
                .or_insert((0.0, Money::zero(), 0));
            entry.0 += item.quantity;
            entry.1 += item.line_total();
            entry.2 += 1;
        }

        let mut categories: Vec<CategorySummary> = groups
            .into_iter()
            .map(|(category, (total_quantity, total_value, line_count))| CategorySummary {
                category,
                total_quantity,
                total_value,
                line_count,
            })
            .collect();
        // Stable sort keeps category order among equal values
        categories.sort_by(|a, b| b.total_value.cmp(&a.total_value));

        Self { date, categories }
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Categories: {}\n", self.date));
        output.push_str(&"=".repeat(48));
        output.push('\n');
        output.push_str(&format!(
            "{:<12} {:>10} {:>14} {:>8}\n",
            "Category", "Qty", "Value", "Lines"
        ));
        output.push_str(&"-".repeat(48));
        output.push('\n');

        for c in &self.categories {
            output.push_str(&format!(
                "{:<12} {:>10} {:>14} {:>8}\n",
                c.category.as_str(),
                c.total_quantity,
                c.total_value.to_string(),
                c.line_count
            ));
        }

        output
    }

    pub fn export_csv<W: Write>(&self, writer: &mut W) -> PastificioResult<()> {
        let mut csv = csv_writer(writer);
        csv.write_record(["Date", "Category", "Quantity", "Value", "Lines"])
            .map_err(csv_error)?;
        for c in &self.categories {
            csv.write_record([
                self.date.to_string(),
                c.category.to_string(),
                c.total_quantity.to_string(),
                format!("{:.2}", c.total_value.as_f64()),
                c.line_count.to_string(),
            ])
            .map_err(csv_error)?;
        }
        csv.flush().map_err(csv_error)?;
        Ok(())
    }
}
