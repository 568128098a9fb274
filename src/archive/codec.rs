//! Reading and writing archive files

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, info};

use super::pipeline::{Pipeline, ENCRYPT_SUFFIX, GZIP_SUFFIX};
use super::{Archive, ArchiveBody, ArchiveDocument, ArchiveMetadata, ArchiveType, BackupOptions};
use crate::crypto::{KeyDerivationParams, SecureString};
use crate::error::{PastificioError, PastificioResult};
use crate::models::{Snapshot, SNAPSHOT_SCHEMA_VERSION};
use crate::storage::write_bytes_atomic;

/// `name` without any trailing `.gz`/`.enc` stage suffixes
pub fn strip_stage_suffixes(name: &str) -> &str {
    let mut stem = name.trim();
    loop {
        if let Some(s) = stem.strip_suffix(ENCRYPT_SUFFIX) {
            stem = s;
        } else if let Some(s) = stem.strip_suffix(GZIP_SUFFIX) {
            stem = s;
        } else {
            return stem;
        }
    }
}

/// Final archive filename for `base_name` written with `options`
///
/// Trailing `.gz`/`.enc` suffixes are stripped from the base name, then the
/// suffixes of the stages that will run are appended.
pub fn archive_filename(base_name: &str, options: &BackupOptions) -> PastificioResult<String> {
    let stem = strip_stage_suffixes(base_name);

    if stem.is_empty() {
        return Err(PastificioError::Validation(
            "Backup name cannot be empty".into(),
        ));
    }
    if stem.contains('/') || stem.contains('\\') || stem == "." || stem == ".." {
        return Err(PastificioError::Validation(format!(
            "Backup name '{}' must be a plain file name",
            base_name
        )));
    }

    let mut filename = stem.to_string();
    if options.compress {
        filename.push_str(GZIP_SUFFIX);
    }
    if options.encrypt {
        filename.push_str(ENCRYPT_SUFFIX);
    }
    Ok(filename)
}

/// Encodes and decodes archives in one backup directory
#[derive(Debug, Clone)]
pub struct ArchiveCodec {
    backup_dir: PathBuf,
    secret: Option<SecureString>,
    kdf: KeyDerivationParams,
}

impl ArchiveCodec {
    pub fn new(backup_dir: PathBuf, secret: Option<SecureString>, kdf: KeyDerivationParams) -> Self {
        Self {
            backup_dir,
            secret,
            kdf,
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Whether an encryption secret is configured
    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Write `snapshot` as an archive named after `base_name`
    pub fn create_backup(
        &self,
        snapshot: &Snapshot,
        base_name: &str,
        options: &BackupOptions,
    ) -> PastificioResult<Archive> {
        snapshot.validate()?;
        self.write_archive(ArchiveBody::Snapshot(snapshot.clone()), base_name, options)
    }

    /// Serialize `body`, run it through the stages for `options` and write it
    /// atomically into the backup directory
    pub fn write_archive(
        &self,
        body: ArchiveBody,
        base_name: &str,
        options: &BackupOptions,
    ) -> PastificioResult<Archive> {
        let filename = archive_filename(base_name, options)?;
        let pipeline = Pipeline::from_options(options, self.secret.as_ref(), &self.kdf)?;

        let raw_size = serde_json::to_vec(&body)?.len() as u64;
        let metadata = ArchiveMetadata {
            created_at: Utc::now(),
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            raw_size,
            archive_type: options.archive_type,
            compressed: options.compress,
            encrypted: options.encrypt,
        };
        let document = ArchiveDocument {
            metadata: metadata.clone(),
            body,
        };

        let bytes = serde_json::to_vec(&document)?;
        debug!(
            "Encoding {} ({} bytes) through stages {:?}",
            filename,
            bytes.len(),
            pipeline.names()
        );
        let encoded = pipeline.forward(bytes)?;

        fs::create_dir_all(&self.backup_dir).map_err(|e| {
            PastificioError::Io(format!("Failed to create backup directory: {}", e))
        })?;
        let path = self.backup_dir.join(&filename);
        write_bytes_atomic(&path, &encoded)?;

        info!(
            "Wrote {} archive {} ({} bytes)",
            metadata.archive_type,
            filename,
            encoded.len()
        );

        Ok(Archive {
            filename,
            path,
            size_bytes: encoded.len() as u64,
            metadata,
        })
    }

    /// Decode the document stored in `filename`
    pub fn read_archive(&self, filename: &str) -> PastificioResult<ArchiveDocument> {
        let path = self.backup_dir.join(filename);
        if !path.is_file() {
            return Err(PastificioError::backup_not_found(filename));
        }

        let bytes = fs::read(&path)
            .map_err(|e| PastificioError::Io(format!("Failed to read {}: {}", filename, e)))?;

        let pipeline = Pipeline::from_filename(filename, self.secret.as_ref(), &self.kdf);
        let decoded = pipeline.inverse(bytes).map_err(|e| match e {
            PastificioError::Decryption(_) => e,
            other => PastificioError::corrupt(filename, other.to_string()),
        })?;

        serde_json::from_slice(&decoded)
            .map_err(|e| PastificioError::corrupt(filename, format!("Invalid archive document: {}", e)))
    }

    /// Restore the snapshot recorded by `filename`
    ///
    /// An incremental archive is replayed on top of the full archive it was
    /// computed against.
    pub fn restore_backup(&self, filename: &str) -> PastificioResult<Snapshot> {
        let document = self.read_archive(filename)?;

        let snapshot = match document.body {
            ArchiveBody::Snapshot(snapshot) => snapshot,
            ArchiveBody::Changeset(changes) => {
                let baseline = match &changes.base_version {
                    Some(base) => self.restore_full(base, filename)?,
                    None => Snapshot::empty(changes.captured_at),
                };
                changes
                    .apply_to(&baseline)
                    .map_err(|e| PastificioError::corrupt(filename, e.to_string()))?
            }
        };

        snapshot
            .validate()
            .map_err(|e| PastificioError::corrupt(filename, e.to_string()))?;
        Ok(snapshot)
    }

    /// Snapshot of a full archive that an incremental refers to
    fn restore_full(&self, base: &str, referenced_by: &str) -> PastificioResult<Snapshot> {
        let document = self.read_archive(base)?;
        match document.body {
            ArchiveBody::Snapshot(snapshot) if document.metadata.archive_type == ArchiveType::Full => {
                snapshot
                    .validate()
                    .map_err(|e| PastificioError::corrupt(base, e.to_string()))?;
                Ok(snapshot)
            }
            _ => Err(PastificioError::corrupt(
                referenced_by,
                format!("Base archive '{}' is not a full backup", base),
            )),
        }
    }
}
