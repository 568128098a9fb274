//! Incremental backups
//!
//! Incremental archives are cumulative: each one holds the changes of the
//! current snapshot against the latest full archive, so a restore needs the
//! full archive plus a single incremental.

use chrono::Utc;
use log::{info, warn};

use super::store::{BackupInfo, BackupStore};
use crate::archive::{strip_stage_suffixes, Archive, ArchiveBody, ArchiveType, BackupOptions};
use crate::error::{PastificioError, PastificioResult};
use crate::models::{ChangeSet, Snapshot};

/// Timestamp suffix of incremental archive names, e.g. `20261018T000000123Z`
pub const INCREMENTAL_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%3fZ";

impl BackupStore {
    /// Write an incremental archive of `snapshot` named after `base_name`
    ///
    /// Returns `None`, writing nothing, when nothing changed since the most
    /// recent backup on the current full archive.
    pub fn compute_incremental(
        &self,
        snapshot: &Snapshot,
        base_name: &str,
    ) -> PastificioResult<Option<Archive>> {
        if !self.codec().has_secret() {
            return Err(PastificioError::Config(
                "Incremental backups are encrypted but no backup key is configured".into(),
            ));
        }
        snapshot.validate()?;

        let backups = self.list_backups()?;
        let full = backups.iter().find(|b| b.is_full());
        let base_version = full.map(|b| b.filename.clone());

        let baseline = match full {
            Some(info) => self.codec().restore_backup(&info.filename)?,
            None => Snapshot::empty(snapshot.captured_at()),
        };

        let latest = match self.latest_incremental(&backups, base_version.as_deref()) {
            Some(changes) => changes.apply_to(&baseline)?,
            None => baseline.clone(),
        };

        if ChangeSet::between(&latest, snapshot, None)?.is_empty() {
            info!(
                "No changes since the last backup on {}",
                base_version.as_deref().unwrap_or("an empty baseline")
            );
            return Ok(None);
        }

        let changes = ChangeSet::between(&baseline, snapshot, base_version)?;
        let (added, removed, modified) = changes.summary();
        info!(
            "Incremental backup: {} added, {} removed, {} modified",
            added, removed, modified
        );

        let name = format!(
            "{}-inc-{}",
            strip_stage_suffixes(base_name),
            Utc::now().format(INCREMENTAL_TIMESTAMP_FORMAT)
        );
        let archive = self.codec().write_archive(
            ArchiveBody::Changeset(changes),
            &name,
            &BackupOptions::incremental(self.compression_level()),
        )?;

        Ok(Some(archive))
    }

    /// Change set of the newest incremental built on `base_version`
    fn latest_incremental(
        &self,
        backups: &[BackupInfo],
        base_version: Option<&str>,
    ) -> Option<ChangeSet> {
        backups
            .iter()
            .filter(|b| b.archive_type() == Some(ArchiveType::Incremental))
            .find_map(|b| match self.codec().read_archive(&b.filename) {
                Ok(document) => match document.body {
                    ArchiveBody::Changeset(changes)
                        if changes.base_version.as_deref() == base_version =>
                    {
                        Some(changes)
                    }
                    _ => None,
                },
                Err(e) => {
                    warn!("Skipping incremental {}: {}", b.filename, e);
                    None
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveCodec;
    use crate::crypto::key_derivation::cheap_params;
    use crate::crypto::SecureString;
    use crate::models::{Money, Order, OrderItem, OrderStatus, ProductCategory};
    use chrono::{Datelike, NaiveDate};
    use tempfile::TempDir;

    fn create_test_store(secret: Option<&str>) -> (TempDir, BackupStore) {
        let temp_dir = TempDir::new().unwrap();
        let codec = ArchiveCodec::new(
            temp_dir.path().join("backups"),
            secret.map(SecureString::new),
            cheap_params(),
        );
        (temp_dir, BackupStore::new(codec, 7, 6))
    }

    fn create_test_order(customer: &str) -> Order {
        Order::new(
            customer,
            "070321",
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            "09:30",
        )
        .with_item(OrderItem::new(
            ProductCategory::Pasta,
            "Culurgiones",
            2.0,
            Money::from_euros(15),
        ))
    }

    #[test]
    fn test_requires_key() {
        let (_temp, store) = create_test_store(None);
        let snapshot = Snapshot::capture(vec![create_test_order("a")], vec![]);
        let err = store.compute_incremental(&snapshot, "backup").unwrap_err();
        assert!(matches!(err, PastificioError::Config(_)));
        assert!(store.list_backups().unwrap().is_empty());
    }

    #[test]
    fn test_unchanged_snapshot_writes_nothing() {
        let (_temp, store) = create_test_store(Some("segreto"));
        let snapshot = Snapshot::capture(vec![create_test_order("a")], vec![]);
        store
            .codec()
            .create_backup(&snapshot, "settimana", &BackupOptions::default())
            .unwrap();

        assert!(store.compute_incremental(&snapshot, "backup").unwrap().is_none());
        assert_eq!(store.list_backups().unwrap().len(), 1);
    }

    #[test]
    fn test_second_identical_call_returns_none() {
        let (_temp, store) = create_test_store(Some("segreto"));
        let first = create_test_order("a");
        let base = Snapshot::capture(vec![first.clone()], vec![]);
        let full = store
            .codec()
            .create_backup(&base, "settimana", &BackupOptions::default())
            .unwrap();

        let current = Snapshot::capture(vec![first, create_test_order("b")], vec![]);
        let archive = store
            .compute_incremental(&current, "backup")
            .unwrap()
            .unwrap();
        assert!(archive.filename.starts_with("backup-inc-"));
        assert!(archive.filename.ends_with(".gz.enc"));
        assert_eq!(archive.metadata.archive_type, ArchiveType::Incremental);
        assert!(archive.metadata.compressed && archive.metadata.encrypted);

        let document = store.codec().read_archive(&archive.filename).unwrap();
        match document.body {
            ArchiveBody::Changeset(changes) => {
                assert_eq!(changes.base_version.as_deref(), Some(full.filename.as_str()));
                assert_eq!(changes.summary(), (1, 0, 0));
            }
            ArchiveBody::Snapshot(_) => panic!("expected a change set"),
        }

        assert!(store.compute_incremental(&current, "backup").unwrap().is_none());
    }

    #[test]
    fn test_incremental_restore_reproduces_snapshot() {
        let (_temp, store) = create_test_store(Some("segreto"));
        let mut kept = create_test_order("a");
        let gone = create_test_order("b");
        let base = Snapshot::capture(vec![kept.clone(), gone], vec![]);
        store
            .codec()
            .create_backup(&base, "settimana", &BackupOptions::default())
            .unwrap();

        kept.set_status(OrderStatus::Completed);
        let current = Snapshot::capture(vec![kept, create_test_order("c")], vec![]);
        let archive = store
            .compute_incremental(&current, "backup")
            .unwrap()
            .unwrap();

        let restored = store.codec().restore_backup(&archive.filename).unwrap();
        assert_eq!(restored, current);
    }

    #[test]
    fn test_restore_keeps_pickup_order_of_added_orders() {
        let (_temp, store) = create_test_store(Some("segreto"));
        let orders: Vec<Order> = (1..=6)
            .map(|day| {
                let mut order = create_test_order(&format!("cliente {}", day));
                order.pickup_date = NaiveDate::from_ymd_opt(2026, 10, day).unwrap();
                order
            })
            .collect();
        let current = Snapshot::capture(orders, vec![]);

        let archive = store
            .compute_incremental(&current, "daily-backup")
            .unwrap()
            .unwrap();
        let restored = store.codec().restore_backup(&archive.filename).unwrap();

        let dates: Vec<u32> = restored.orders().iter().map(|o| o.pickup_date.day()).collect();
        assert_eq!(dates, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(restored, current);
    }

    #[test]
    fn test_incrementals_are_cumulative() {
        let (_temp, store) = create_test_store(Some("segreto"));
        let a = create_test_order("a");
        let base = Snapshot::capture(vec![a.clone()], vec![]);
        store
            .codec()
            .create_backup(&base, "settimana", &BackupOptions::default())
            .unwrap();

        let b = create_test_order("b");
        let day_one = Snapshot::capture(vec![a.clone(), b.clone()], vec![]);
        store.compute_incremental(&day_one, "backup").unwrap().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));

        let day_two = Snapshot::capture(vec![a, b, create_test_order("c")], vec![]);
        let second = store
            .compute_incremental(&day_two, "backup")
            .unwrap()
            .unwrap();

        match store.codec().read_archive(&second.filename).unwrap().body {
            ArchiveBody::Changeset(changes) => assert_eq!(changes.summary(), (2, 0, 0)),
            ArchiveBody::Snapshot(_) => panic!("expected a change set"),
        }
    }

    #[test]
    fn test_without_full_backup_diffs_against_empty() {
        let (_temp, store) = create_test_store(Some("segreto"));
        let current = Snapshot::capture(vec![create_test_order("a")], vec![]);

        let archive = store
            .compute_incremental(&current, "backup.gz")
            .unwrap()
            .unwrap();
        assert!(archive.filename.starts_with("backup-inc-"));
        assert_eq!(store.codec().restore_backup(&archive.filename).unwrap(), current);
    }
}
