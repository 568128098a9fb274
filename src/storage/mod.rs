//! Storage layer for the pastificio backoffice
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation. The backup engine reads the whole store as a [`Snapshot`] and
//! writes a restored snapshot back through [`Storage::replace_from_snapshot`].

pub mod file_io;
pub mod orders;
pub mod users;

pub use file_io::{read_json, write_bytes_atomic, write_json_atomic};
pub use orders::OrderRepository;
pub use users::UserRepository;

use crate::config::PastificioPaths;
use crate::error::PastificioError;
use crate::models::Snapshot;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: PastificioPaths,
    pub orders: OrderRepository,
    pub users: UserRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: PastificioPaths) -> Result<Self, PastificioError> {
        paths.ensure_directories()?;

        Ok(Self {
            orders: OrderRepository::new(paths.orders_file()),
            users: UserRepository::new(paths.users_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &PastificioPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), PastificioError> {
        self.orders.load()?;
        self.users.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), PastificioError> {
        self.orders.save()?;
        self.users.save()?;
        Ok(())
    }

    /// Capture the current records
    pub fn snapshot(&self) -> Result<Snapshot, PastificioError> {
        Ok(Snapshot::capture(
            self.orders.get_all()?,
            self.users.get_all()?,
        ))
    }

    /// Overwrite the store with the records of a snapshot and persist them
    pub fn replace_from_snapshot(&self, snapshot: &Snapshot) -> Result<(), PastificioError> {
        self.orders.replace_all(snapshot.orders().to_vec())?;
        self.users.replace_all(snapshot.users().to_vec())?;
        self.save_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, Order, OrderItem, ProductCategory, Role, User};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = PastificioPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_storage_creation() {
        let (temp_dir, _storage) = create_test_storage();
        assert!(temp_dir.path().join("data").exists());
        assert!(temp_dir.path().join("backups").exists());
    }

    #[test]
    fn test_snapshot_and_replace() {
        let (temp_dir, storage) = create_test_storage();
        let order = Order::new(
            "Luca",
            "070111",
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            "17:00",
        )
        .with_item(OrderItem::new(
            ProductCategory::Dolci,
            "Pardulas",
            12.0,
            Money::from_cents(120),
        ));
        storage.orders.upsert(order.clone()).unwrap();
        storage.users.upsert(User::new("anna", Role::Admin)).unwrap();

        let snapshot = storage.snapshot().unwrap();
        assert_eq!(snapshot.orders(), &[order.clone()]);

        storage.orders.replace_all(Vec::new()).unwrap();
        storage.replace_from_snapshot(&snapshot).unwrap();

        let reopened =
            Storage::new(PastificioPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        reopened.load_all().unwrap();
        assert_eq!(reopened.orders.get(order.id).unwrap(), Some(order));
        assert_eq!(reopened.users.count().unwrap(), 1);
    }
}
