//! Backup system for the pastificio backoffice
//!
//! # Architecture
//!
//! - [`BackupStore`]: lists archives in the backup directory, enforces the
//!   retention window and monitors the directory size
//! - [`BackupStore::compute_incremental`]: writes cumulative change sets
//!   against the latest full archive
//! - [`sweep_temp_files`]: best-effort removal of stale scratch files
//!
//! Encoding and decoding of the archive files themselves lives in
//! [`crate::archive`].
//!
//! # Retention Policy
//!
//! Full archives are kept forever. Incremental archives, and files too
//! damaged to decode, are deleted once older than the retention window
//! (7 days by default). Archives that fail to decrypt are kept.
//!
//! # Example
//!
//! ```rust,ignore
//! use pastificio::backup::BackupStore;
//!
//! let store = BackupStore::from_settings(codec, &settings.backup);
//! let snapshot = storage.snapshot()?;
//! if let Some(archive) = store.compute_incremental(&snapshot, "backup")? {
//!     println!("wrote {}", archive.filename);
//! }
//! store.cleanup_old_backups()?;
//! ```

mod incremental;
mod store;

pub use incremental::INCREMENTAL_TIMESTAMP_FORMAT;
pub use store::{
    sweep_temp_files, sweep_temp_files_at, BackupInfo, BackupStore, ReadFailure, SizeReport,
};
