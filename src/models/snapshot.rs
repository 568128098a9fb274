//! Snapshot model
//!
//! A snapshot is the full set of persisted business records at one instant,
//! bundled as named record collections. Each collection is a tagged union
//! member so archives stay self-describing, and the schema version lets the
//! codec reject shapes it does not understand.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::order::Order;
use super::user::User;
use crate::error::{PastificioError, PastificioResult};

/// Snapshot schema version written by this build
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Name of a record collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Orders,
    Users,
}

impl CollectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::Users => "users",
        }
    }
}

/// One named collection of records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "collection", content = "records", rename_all = "lowercase")]
pub enum RecordCollection {
    Orders(Vec<Order>),
    Users(Vec<User>),
}

impl RecordCollection {
    /// An empty collection of the given kind
    pub fn empty(kind: CollectionKind) -> Self {
        match kind {
            CollectionKind::Orders => Self::Orders(Vec::new()),
            CollectionKind::Users => Self::Users(Vec::new()),
        }
    }

    pub fn kind(&self) -> CollectionKind {
        match self {
            Self::Orders(_) => CollectionKind::Orders,
            Self::Users(_) => CollectionKind::Users,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Orders(records) => records.len(),
            Self::Users(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records as (identity key, JSON value) pairs, in collection order
    pub fn keyed_records(&self) -> PastificioResult<Vec<(String, Value)>> {
        fn keyed<T: Serialize>(
            records: &[T],
            key: impl Fn(&T) -> String,
        ) -> PastificioResult<Vec<(String, Value)>> {
            records
                .iter()
                .map(|record| Ok((key(record), serde_json::to_value(record)?)))
                .collect()
        }

        match self {
            Self::Orders(records) => keyed(records, |order| order.id.key()),
            Self::Users(records) => keyed(records, |user| user.id.key()),
        }
    }

    /// Rebuild a typed collection from JSON record values
    pub fn from_values(kind: CollectionKind, values: Vec<Value>) -> PastificioResult<Self> {
        fn typed<T: serde::de::DeserializeOwned>(values: Vec<Value>) -> PastificioResult<Vec<T>> {
            values
                .into_iter()
                .map(|value| serde_json::from_value(value).map_err(PastificioError::from))
                .collect()
        }

        Ok(match kind {
            CollectionKind::Orders => Self::Orders(typed(values)?),
            CollectionKind::Users => Self::Users(typed(values)?),
        })
    }

    fn ids(&self) -> Vec<String> {
        match self {
            Self::Orders(records) => records.iter().map(|order| order.id.key()).collect(),
            Self::Users(records) => records.iter().map(|user| user.id.key()).collect(),
        }
    }
}

/// Full copy of the business records at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    schema_version: u32,
    captured_at: DateTime<Utc>,
    collections: Vec<RecordCollection>,
}

impl Snapshot {
    /// Bundle collections captured at `captured_at`
    pub fn new(captured_at: DateTime<Utc>, collections: Vec<RecordCollection>) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            captured_at,
            collections,
        }
    }

    /// Snapshot of the shop's orders and users, captured now
    pub fn capture(orders: Vec<Order>, users: Vec<User>) -> Self {
        Self::new(
            Utc::now(),
            vec![RecordCollection::Orders(orders), RecordCollection::Users(users)],
        )
    }

    /// A snapshot with no collections (the baseline before any full backup)
    pub fn empty(captured_at: DateTime<Utc>) -> Self {
        Self::new(captured_at, Vec::new())
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn collections(&self) -> &[RecordCollection] {
        &self.collections
    }

    pub fn collection(&self, kind: CollectionKind) -> Option<&RecordCollection> {
        self.collections.iter().find(|c| c.kind() == kind)
    }

    /// Orders in the snapshot (empty if the collection is absent)
    pub fn orders(&self) -> &[Order] {
        match self.collection(CollectionKind::Orders) {
            Some(RecordCollection::Orders(orders)) => orders,
            _ => &[],
        }
    }

    /// Users in the snapshot (empty if the collection is absent)
    pub fn users(&self) -> &[User] {
        match self.collection(CollectionKind::Users) {
            Some(RecordCollection::Users(users)) => users,
            _ => &[],
        }
    }

    /// Total number of records across collections
    pub fn record_count(&self) -> usize {
        self.collections.iter().map(RecordCollection::len).sum()
    }

    /// Check the shape: known schema, each collection once, unique record ids
    pub fn validate(&self) -> PastificioResult<()> {
        if self.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(PastificioError::Validation(format!(
                "Unsupported snapshot schema version {} (expected {})",
                self.schema_version, SNAPSHOT_SCHEMA_VERSION
            )));
        }

        let mut kinds = HashSet::new();
        for collection in &self.collections {
            let kind = collection.kind();
            if !kinds.insert(kind) {
                return Err(PastificioError::Validation(format!(
                    "Collection '{}' appears more than once",
                    kind.as_str()
                )));
            }

            let mut ids = HashSet::new();
            for id in collection.ids() {
                if !ids.insert(id.clone()) {
                    return Err(PastificioError::Validation(format!(
                        "Duplicate record {} in collection '{}'",
                        id,
                        kind.as_str()
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, OrderItem, ProductCategory, Role};
    use chrono::NaiveDate;

    fn order() -> Order {
        Order::new(
            "Antonio",
            "070123456",
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            "09:00",
        )
        .with_item(OrderItem::new(
            ProductCategory::Panadas,
            "Panada di agnello",
            1.0,
            Money::from_euros(18),
        ))
    }

    #[test]
    fn test_capture_and_accessors() {
        let snapshot = Snapshot::capture(vec![order()], vec![User::new("anna", Role::Admin)]);
        assert_eq!(snapshot.schema_version(), SNAPSHOT_SCHEMA_VERSION);
        assert_eq!(snapshot.orders().len(), 1);
        assert_eq!(snapshot.users().len(), 1);
        assert_eq!(snapshot.record_count(), 2);
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn test_tagged_collection_json() {
        let snapshot = Snapshot::capture(vec![], vec![]);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["collections"][0]["collection"], "orders");
        assert!(json["collections"][0]["records"].is_array());
    }

    #[test]
    fn test_duplicate_collection_rejected() {
        let snapshot = Snapshot::new(
            Utc::now(),
            vec![
                RecordCollection::Orders(vec![]),
                RecordCollection::Orders(vec![]),
            ],
        );
        assert!(snapshot.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_duplicate_record_rejected() {
        let o = order();
        let snapshot = Snapshot::new(Utc::now(), vec![RecordCollection::Orders(vec![o.clone(), o])]);
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_unknown_schema_rejected() {
        let mut json = serde_json::to_value(Snapshot::empty(Utc::now())).unwrap();
        json["schema_version"] = serde_json::json!(99);
        let snapshot: Snapshot = serde_json::from_value(json).unwrap();
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_keyed_records_round_trip() {
        let collection = RecordCollection::Orders(vec![order()]);
        let keyed = collection.keyed_records().unwrap();
        assert_eq!(keyed.len(), 1);

        let values = keyed.into_iter().map(|(_, v)| v).collect();
        let rebuilt = RecordCollection::from_values(CollectionKind::Orders, values).unwrap();
        assert_eq!(rebuilt, collection);
    }
}
