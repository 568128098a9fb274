//! Process-scoped application state
//!
//! One [`AppState`] owns everything a command or scheduled job needs: paths,
//! settings, the record store and the backup store. It is created once with
//! [`AppState::init`] and torn down with [`AppState::shutdown`], which takes
//! a final backup.

use chrono::Utc;
use log::{error, info};

use crate::archive::{Archive, ArchiveCodec, BackupOptions};
use crate::backup::{BackupStore, INCREMENTAL_TIMESTAMP_FORMAT};
use crate::config::{backup_secret_from_env, PastificioPaths, Settings};
use crate::crypto::SecureString;
use crate::error::PastificioResult;
use crate::models::Snapshot;
use crate::storage::Storage;

/// Base name of the weekly scheduled full backup
pub const FULL_BACKUP_PREFIX: &str = "full-backup";

/// Base name of the daily incremental backups
pub const DAILY_BACKUP_NAME: &str = "daily-backup";

/// Base name of the backup taken on shutdown
pub const SHUTDOWN_BACKUP_PREFIX: &str = "shutdown-backup";

/// `{prefix}-{timestamp}` archive base name
pub fn timestamped_name(prefix: &str) -> String {
    format!("{}-{}", prefix, Utc::now().format(INCREMENTAL_TIMESTAMP_FORMAT))
}

pub struct AppState {
    paths: PastificioPaths,
    settings: Settings,
    storage: Storage,
    backups: BackupStore,
}

impl AppState {
    /// Open the data directory, loading settings and records
    pub fn init(paths: PastificioPaths, secret: Option<SecureString>) -> PastificioResult<Self> {
        paths.ensure_directories()?;
        let settings = Settings::load_or_create(&paths)?;

        let storage = Storage::new(paths.clone())?;
        storage.load_all()?;

        let codec = ArchiveCodec::new(
            paths.backup_dir(),
            secret,
            settings.backup.key_derivation.clone(),
        );
        let backups = BackupStore::from_settings(codec, &settings.backup);

        info!("Opened data directory {}", paths.base_dir().display());

        Ok(Self {
            paths,
            settings,
            storage,
            backups,
        })
    }

    /// [`init`](Self::init) with the default paths and the secret from the environment
    pub fn from_env() -> PastificioResult<Self> {
        Self::init(PastificioPaths::new()?, backup_secret_from_env())
    }

    pub fn paths(&self) -> &PastificioPaths {
        &self.paths
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn backups(&self) -> &BackupStore {
        &self.backups
    }

    /// Replace the backup secret, e.g. after an interactive prompt
    pub fn set_secret(&mut self, secret: SecureString) {
        let codec = ArchiveCodec::new(
            self.paths.backup_dir(),
            Some(secret),
            self.settings.backup.key_derivation.clone(),
        );
        self.backups = BackupStore::from_settings(codec, &self.settings.backup);
    }

    /// Snapshot of the current records
    pub fn snapshot(&self) -> PastificioResult<Snapshot> {
        self.storage.snapshot()
    }

    /// Write a full backup of the current records
    pub fn create_backup(&self, base_name: &str, options: &BackupOptions) -> PastificioResult<Archive> {
        let snapshot = self.snapshot()?;
        self.backups.codec().create_backup(&snapshot, base_name, options)
    }

    /// Write an incremental backup; `None` when nothing changed
    pub fn create_incremental(&self, base_name: &str) -> PastificioResult<Option<Archive>> {
        let snapshot = self.snapshot()?;
        self.backups.compute_incremental(&snapshot, base_name)
    }

    /// Restore an archive and overwrite the record store with it
    pub fn restore_into_storage(&self, filename: &str) -> PastificioResult<Snapshot> {
        let snapshot = self.backups.codec().restore_backup(filename)?;
        self.storage.replace_from_snapshot(&snapshot)?;
        info!(
            "Restored {} records from {}",
            snapshot.record_count(),
            filename
        );
        Ok(snapshot)
    }

    /// Persist the records and take the shutdown backup
    ///
    /// A failed shutdown backup is logged, not returned.
    pub fn shutdown(self) -> PastificioResult<Option<Archive>> {
        self.storage.save_all()?;

        let archive = match self.create_backup(
            &timestamped_name(SHUTDOWN_BACKUP_PREFIX),
            &BackupOptions::default(),
        ) {
            Ok(archive) => Some(archive),
            Err(e) => {
                error!("Shutdown backup failed: {}", e);
                None
            }
        };

        info!("Shut down");
        Ok(archive)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::create_test_state;
    use super::*;
    use crate::models::{Money, Order, OrderItem, ProductCategory};
    use chrono::NaiveDate;

    fn add_order(state: &AppState) -> Order {
        let order = Order::new(
            "Tonino",
            "070444",
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            "18:00",
        )
        .with_item(OrderItem::new(
            ProductCategory::Panadas,
            "Panada di agnello",
            1.0,
            Money::from_euros(22),
        ));
        state.storage().orders.upsert(order.clone()).unwrap();
        order
    }

    #[test]
    fn test_init_creates_layout() {
        let (temp_dir, state) = create_test_state(None);
        assert!(temp_dir.path().join("config.json").exists());
        assert!(temp_dir.path().join("backups").exists());
        assert_eq!(state.settings().backup.retention_days, 7);
    }

    #[test]
    fn test_backup_and_restore_into_storage() {
        let (_temp_dir, state) = create_test_state(None);
        let order = add_order(&state);

        let archive = state.create_backup("manuale", &BackupOptions::default()).unwrap();
        state.storage().orders.delete(order.id).unwrap();
        assert_eq!(state.storage().orders.count().unwrap(), 0);

        state.restore_into_storage(&archive.filename).unwrap();
        assert_eq!(state.storage().orders.get(order.id).unwrap(), Some(order));
    }

    #[test]
    fn test_set_secret_enables_encryption() {
        let (_temp_dir, mut state) = create_test_state(None);
        assert!(!state.backups().codec().has_secret());

        state.set_secret(SecureString::new("segreto"));
        assert!(state.backups().codec().has_secret());
        assert_eq!(state.backups().retention_days(), 7);
    }

    #[test]
    fn test_shutdown_takes_backup() {
        let (temp_dir, state) = create_test_state(None);
        add_order(&state);

        let archive = state.shutdown().unwrap().unwrap();
        assert!(archive.filename.starts_with("shutdown-backup-"));
        assert!(archive.filename.ends_with(".gz"));
        assert!(temp_dir.path().join("data").join("orders.json").exists());
    }
}
