//! Core data models for the pastificio backoffice
//!
//! Business records (orders, staff users), money and identifiers, plus the
//! snapshot and change-set shapes the backup engine archives.

pub mod changeset;
pub mod ids;
pub mod money;
pub mod order;
pub mod snapshot;
pub mod user;

pub use changeset::{ChangeKind, ChangeSet, RecordChange};
pub use ids::{OrderId, UserId};
pub use money::Money;
pub use order::{Order, OrderItem, OrderStatus, ProductCategory, Unit};
pub use snapshot::{CollectionKind, RecordCollection, Snapshot, SNAPSHOT_SCHEMA_VERSION};
pub use user::{Role, User};
