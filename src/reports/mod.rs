//! Reports module for the pastificio backoffice
//!
//! Sales reports computed from the order collection: daily and weekly
//! totals, monthly breakdown with trend, best-selling products and the
//! per-category breakdown of a pickup day. Every report is a pure function of
//! the orders and its window; nothing is cached between calls.
//!
//! JSON field names follow the shop dashboard (`totaleOrdini`,
//! `totaleIncasso`, ...), with amounts in euros.

pub mod categories;
pub mod daily;
pub mod monthly;
pub mod top_products;
pub mod weekly;

pub use categories::{CategoryReport, CategorySummary};
pub use daily::DailyReport;
pub use monthly::{DaySummary, MonthSummary, MonthlyReport, ProductQuantity, Trend};
pub use top_products::{ProductSummary, TopProductsReport, DEFAULT_TOP_PRODUCTS_DAYS};
pub use weekly::{WeekdaySummary, WeeklyReport};

use std::io::Write;

use serde::{Serialize, Serializer};

use crate::error::{PastificioError, PastificioResult};
use crate::models::Money;

/// Any generated report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportResult {
    Daily(DailyReport),
    Weekly(WeeklyReport),
    Monthly(MonthlyReport),
    TopProducts(TopProductsReport),
    Categories(CategoryReport),
}

impl ReportResult {
    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        match self {
            Self::Daily(r) => r.format_terminal(),
            Self::Weekly(r) => r.format_terminal(),
            Self::Monthly(r) => r.format_terminal(),
            Self::TopProducts(r) => r.format_terminal(),
            Self::Categories(r) => r.format_terminal(),
        }
    }

    /// Export the report rows as CSV
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> PastificioResult<()> {
        match self {
            Self::Daily(r) => r.export_csv(writer),
            Self::Weekly(r) => r.export_csv(writer),
            Self::Monthly(r) => r.export_csv(writer),
            Self::TopProducts(r) => r.export_csv(writer),
            Self::Categories(r) => r.export_csv(writer),
        }
    }
}

/// Serialize a money amount as a number of euros
pub(crate) fn serialize_euros<S: Serializer>(amount: &Money, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(amount.as_f64())
}

/// `part / whole * 100`, 0 when `whole` is 0
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

pub(crate) fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::Writer::from_writer(writer)
}

pub(crate) fn csv_error(e: impl std::fmt::Display) -> PastificioError {
    PastificioError::Export(e.to_string())
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use crate::models::{Money, Order, OrderItem, OrderStatus, ProductCategory};

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn create_test_order(
        pickup: NaiveDate,
        lines: &[(ProductCategory, &str, f64, i64)],
        status: OrderStatus,
    ) -> Order {
        let mut order = Order::new("Cliente", "070000000", pickup, "10:00");
        for (category, product, quantity, unit_cents) in lines {
            order = order.with_item(OrderItem::new(
                *category,
                *product,
                *quantity,
                Money::from_cents(*unit_cents),
            ));
        }
        order.status = status;
        order
    }
}
