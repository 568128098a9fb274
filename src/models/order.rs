//! Order model
//!
//! A customer order for pickup: one or more product lines, a pickup date and
//! time, and a lifecycle status tracked by staff.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::OrderId;
use super::money::Money;
use crate::error::PastificioError;

/// Lifecycle status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Just received
    #[default]
    #[serde(rename = "nuovo")]
    New,
    /// Being prepared
    #[serde(rename = "in_lavorazione")]
    InProgress,
    /// Ready for pickup
    #[serde(rename = "completato")]
    Completed,
    /// Handed over to the customer
    #[serde(rename = "consegnato")]
    Delivered,
    /// Cancelled by the customer or the shop
    #[serde(rename = "annullato")]
    Cancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle order
    pub const ALL: [OrderStatus; 5] = [
        Self::New,
        Self::InProgress,
        Self::Completed,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "nuovo",
            Self::InProgress => "in_lavorazione",
            Self::Completed => "completato",
            Self::Delivered => "consegnato",
            Self::Cancelled => "annullato",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = PastificioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| PastificioError::Validation(format!("Unknown order status: {}", s)))
    }
}

/// Product family sold by the shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Pasta,
    Dolci,
    Panadas,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pasta => "pasta",
            Self::Dolci => "dolci",
            Self::Panadas => "panadas",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = PastificioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pasta" => Ok(Self::Pasta),
            "dolci" => Ok(Self::Dolci),
            "panadas" => Ok(Self::Panadas),
            other => Err(PastificioError::Validation(format!(
                "Unknown product category: {}",
                other
            ))),
        }
    }
}

/// Unit a product line is sold in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Unit {
    #[serde(rename = "kg")]
    Kilograms,
    #[serde(rename = "g")]
    Grams,
    #[serde(rename = "unità")]
    Units,
    #[default]
    #[serde(rename = "pezzi")]
    Pieces,
}

/// One product line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub category: ProductCategory,
    pub product: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: Unit,
    /// Price per unit
    pub unit_price: Money,
}

impl OrderItem {
    /// Create a new order line sold by the piece
    pub fn new(
        category: ProductCategory,
        product: impl Into<String>,
        quantity: f64,
        unit_price: Money,
    ) -> Self {
        Self {
            category,
            product: product.into(),
            quantity,
            unit: Unit::default(),
            unit_price,
        }
    }

    /// Line total: quantity times unit price
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// A pickup order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier
    pub id: OrderId,

    pub customer_name: String,

    pub phone: String,

    /// Day the customer collects the order
    pub pickup_date: NaiveDate,

    /// Pickup slot, "HH:MM"
    pub pickup_time: String,

    pub items: Vec<OrderItem>,

    /// Packed for travel (vacuum sealed)
    #[serde(default)]
    pub travel: bool,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub status: OrderStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order
    pub fn new(
        customer_name: impl Into<String>,
        phone: impl Into<String>,
        pickup_date: NaiveDate,
        pickup_time: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            customer_name: customer_name.into(),
            phone: phone.into(),
            pickup_date,
            pickup_time: pickup_time.into(),
            items: Vec::new(),
            travel: false,
            notes: String::new(),
            status: OrderStatus::New,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder-style helper to add a product line
    pub fn with_item(mut self, item: OrderItem) -> Self {
        self.items.push(item);
        self
    }

    /// Order total: sum of line totals
    pub fn total(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }

    /// Move the order to a new status
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Validate the order
    pub fn validate(&self) -> Result<(), PastificioError> {
        if self.customer_name.trim().is_empty() {
            return Err(PastificioError::Validation("Customer name is required".into()));
        }
        if self.phone.trim().is_empty() {
            return Err(PastificioError::Validation("Phone number is required".into()));
        }
        if NaiveTime::parse_from_str(&self.pickup_time, "%H:%M").is_err() {
            return Err(PastificioError::Validation(format!(
                "Pickup time must be HH:MM, got '{}'",
                self.pickup_time
            )));
        }
        if self.items.is_empty() {
            return Err(PastificioError::Validation(
                "An order needs at least one product".into(),
            ));
        }
        for item in &self.items {
            if item.product.trim().is_empty() {
                return Err(PastificioError::Validation("Product name is required".into()));
            }
            if item.quantity.is_nan() || item.quantity <= 0.0 {
                return Err(PastificioError::Validation(format!(
                    "Quantity for '{}' must be positive",
                    item.product
                )));
            }
            if item.unit_price.is_negative() {
                return Err(PastificioError::Validation(format!(
                    "Price for '{}' cannot be negative",
                    item.product
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.id, self.pickup_date, self.pickup_time, self.customer_name, self.total()
        )
    }
}
