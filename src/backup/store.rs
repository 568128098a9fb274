//! Backup directory management
//!
//! Lists archives with their embedded metadata, enforces the retention window
//! on non-full archives and monitors the directory's total size.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::archive::{ArchiveCodec, ArchiveMetadata, ArchiveType};
use crate::config::BackupSettings;
use crate::error::{PastificioError, PastificioResult};

/// Metadata about an archive file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    /// Archive filename
    pub filename: String,
    /// Full path to the archive
    pub path: PathBuf,
    /// Metadata creation time, or the file modification time if unreadable
    pub created_at: DateTime<Utc>,
    /// Size in bytes
    pub size_bytes: u64,
    /// Embedded metadata; `None` when the archive could not be decoded
    pub metadata: Option<ArchiveMetadata>,
    /// Why the metadata is missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_failure: Option<ReadFailure>,
}

/// Why an archive's metadata could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadFailure {
    /// Encrypted and the configured key (if any) does not open it
    Locked,
    /// The payload is damaged
    Corrupt,
}

impl ReadFailure {
    fn of(error: &PastificioError) -> Self {
        match error {
            PastificioError::Decryption(_) | PastificioError::Config(_) => Self::Locked,
            _ => Self::Corrupt,
        }
    }
}

impl fmt::Display for ReadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "locked"),
            Self::Corrupt => write!(f, "unreadable"),
        }
    }
}

impl BackupInfo {
    pub fn archive_type(&self) -> Option<ArchiveType> {
        self.metadata.as_ref().map(|m| m.archive_type)
    }

    pub fn is_full(&self) -> bool {
        self.archive_type() == Some(ArchiveType::Full)
    }

    /// Whether retention may delete this archive once it is old enough
    ///
    /// Only archives known to be non-full, or known to be damaged, qualify.
    /// An archive that fails to decrypt may be a full backup.
    pub fn is_expirable(&self) -> bool {
        match (self.archive_type(), self.read_failure) {
            (Some(archive_type), _) => archive_type != ArchiveType::Full,
            (None, Some(ReadFailure::Locked)) => false,
            (None, _) => true,
        }
    }
}

/// Aggregate size of the backup directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeReport {
    pub total_bytes: u64,
    pub archive_count: usize,
    pub over_threshold: bool,
}

/// Hidden files and `.tmp` leftovers are never archives
fn is_archive_name(name: &str) -> bool {
    !name.starts_with('.') && !name.ends_with(".tmp")
}

fn modified_at(metadata: &fs::Metadata) -> DateTime<Utc> {
    metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

/// Directory of archives with retention and size policies
#[derive(Debug, Clone)]
pub struct BackupStore {
    codec: ArchiveCodec,
    retention_days: u32,
    compression_level: u32,
}

impl BackupStore {
    pub fn new(codec: ArchiveCodec, retention_days: u32, compression_level: u32) -> Self {
        Self {
            codec,
            retention_days,
            compression_level,
        }
    }

    pub fn from_settings(codec: ArchiveCodec, settings: &BackupSettings) -> Self {
        Self::new(codec, settings.retention_days, settings.compression_level)
    }

    pub fn codec(&self) -> &ArchiveCodec {
        &self.codec
    }

    pub fn backup_dir(&self) -> &Path {
        self.codec.backup_dir()
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Gzip level used for incremental archives
    pub fn compression_level(&self) -> u32 {
        self.compression_level
    }

    /// List all archives, newest first
    ///
    /// An archive whose metadata cannot be decoded is still listed, with
    /// `metadata: None`.
    pub fn list_backups(&self) -> PastificioResult<Vec<BackupInfo>> {
        let dir = self.backup_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(dir).map_err(|e| {
            PastificioError::Io(format!("Failed to read backup directory: {}", e))
        })? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable backup directory entry: {}", e);
                    continue;
                }
            };

            let filename = entry.file_name().to_string_lossy().into_owned();
            if !is_archive_name(&filename) {
                continue;
            }

            match entry.metadata() {
                Ok(file_meta) if file_meta.is_file() => {
                    backups.push(self.describe(&filename, entry.path(), &file_meta));
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping {}: {}", filename, e),
            }
        }

        backups.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.filename.cmp(&a.filename))
        });

        Ok(backups)
    }

    fn describe(&self, filename: &str, path: PathBuf, file_meta: &fs::Metadata) -> BackupInfo {
        let (metadata, read_failure) = match self.codec.read_archive(filename) {
            Ok(document) => (Some(document.metadata), None),
            Err(e) => {
                warn!("Could not read metadata of {}: {}", filename, e);
                (None, Some(ReadFailure::of(&e)))
            }
        };

        BackupInfo {
            filename: filename.to_string(),
            path,
            created_at: metadata
                .as_ref()
                .map(|m| m.created_at)
                .unwrap_or_else(|| modified_at(file_meta)),
            size_bytes: file_meta.len(),
            metadata,
            read_failure,
        }
    }

    /// Get a specific archive by filename
    pub fn get_backup(&self, filename: &str) -> PastificioResult<Option<BackupInfo>> {
        if !is_archive_name(filename) || filename.contains(['/', '\\']) {
            return Ok(None);
        }

        let path = self.backup_dir().join(filename);
        match fs::metadata(&path) {
            Ok(file_meta) if file_meta.is_file() => {
                Ok(Some(self.describe(filename, path, &file_meta)))
            }
            _ => Ok(None),
        }
    }

    /// The most recent full archive (ties broken by filename, descending)
    pub fn latest_full(&self) -> PastificioResult<Option<BackupInfo>> {
        Ok(self.list_backups()?.into_iter().find(BackupInfo::is_full))
    }

    /// Delete non-full archives older than the retention window
    ///
    /// Archives that cannot be decrypted are kept, since their type is
    /// unknown. Returns the number of deleted files.
    pub fn cleanup_old_backups(&self) -> PastificioResult<usize> {
        self.cleanup_old_backups_at(Utc::now())
    }

    /// [`cleanup_old_backups`](Self::cleanup_old_backups) as of `now`
    pub fn cleanup_old_backups_at(&self, now: DateTime<Utc>) -> PastificioResult<usize> {
        let cutoff = now - Duration::days(i64::from(self.retention_days));
        let mut deleted = 0;

        for backup in self.list_backups()? {
            if !backup.is_expirable() || backup.created_at >= cutoff {
                continue;
            }

            match fs::remove_file(&backup.path) {
                Ok(()) => {
                    info!("Deleted old backup {}", backup.filename);
                    deleted += 1;
                }
                Err(e) => warn!("Failed to delete old backup {}: {}", backup.filename, e),
            }
        }

        Ok(deleted)
    }

    /// Total size of all archives in bytes
    pub fn total_size(&self) -> PastificioResult<u64> {
        Ok(self.list_backups()?.iter().map(|b| b.size_bytes).sum())
    }

    /// Compare the directory size against `threshold_bytes`, warning above it
    pub fn check_size(&self, threshold_bytes: u64) -> PastificioResult<SizeReport> {
        let backups = self.list_backups()?;
        let total_bytes: u64 = backups.iter().map(|b| b.size_bytes).sum();
        let over_threshold = total_bytes > threshold_bytes;

        if over_threshold {
            warn!(
                "Backup directory holds {} bytes across {} archives (threshold {} bytes)",
                total_bytes,
                backups.len(),
                threshold_bytes
            );
        }

        Ok(SizeReport {
            total_bytes,
            archive_count: backups.len(),
            over_threshold,
        })
    }
}

/// Delete regular files in `dir` last modified more than `max_age` ago
///
/// Best-effort: failures are logged and skipped. A missing directory holds
/// nothing to sweep.
pub fn sweep_temp_files(dir: &Path, max_age: Duration) -> usize {
    sweep_temp_files_at(dir, max_age, Utc::now())
}

/// [`sweep_temp_files`] as of `now`
pub fn sweep_temp_files_at(dir: &Path, max_age: Duration, now: DateTime<Utc>) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            if dir.exists() {
                warn!("Failed to read temp directory {}: {}", dir.display(), e);
            }
            return 0;
        }
    };

    let cutoff = now - max_age;
    let mut deleted = 0;

    for entry in entries.flatten() {
        let Ok(file_meta) = entry.metadata() else {
            continue;
        };
        if !file_meta.is_file() || modified_at(&file_meta) >= cutoff {
            continue;
        }

        match fs::remove_file(entry.path()) {
            Ok(()) => deleted += 1,
            Err(e) => warn!("Failed to delete temp file {}: {}", entry.path().display(), e),
        }
    }

    if deleted > 0 {
        info!("Swept {} temp files from {}", deleted, dir.display());
    }
    deleted
}
