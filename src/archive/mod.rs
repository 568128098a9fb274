//! Archive codec
//!
//! Turns snapshots and change sets into durable archive files and back.
//! An archive file holds one JSON [`ArchiveDocument`] (metadata plus body)
//! passed through the stages of a [`pipeline::Pipeline`].

pub mod codec;
pub mod pipeline;

pub use codec::{archive_filename, strip_stage_suffixes, ArchiveCodec};
pub use pipeline::{EncryptStage, GzipStage, Pipeline, Transform, ENCRYPT_SUFFIX, GZIP_SUFFIX};

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ChangeSet, Snapshot};

/// Whether an archive holds a whole snapshot or a change set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveType {
    #[default]
    Full,
    Incremental,
}

impl fmt::Display for ArchiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Incremental => write!(f, "incremental"),
        }
    }
}

/// Options for writing an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupOptions {
    pub archive_type: ArchiveType,
    pub compress: bool,
    pub encrypt: bool,
    /// Gzip level, 1-9
    pub compression_level: u32,
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self {
            archive_type: ArchiveType::Full,
            compress: true,
            encrypt: false,
            compression_level: 6,
        }
    }
}

impl BackupOptions {
    /// The weekly scheduled full backup: compressed at level 9 and encrypted
    pub fn weekly_full() -> Self {
        Self {
            archive_type: ArchiveType::Full,
            compress: true,
            encrypt: true,
            compression_level: 9,
        }
    }

    /// Incremental archives are always compressed and encrypted
    pub fn incremental(compression_level: u32) -> Self {
        Self {
            archive_type: ArchiveType::Incremental,
            compress: true,
            encrypt: true,
            compression_level,
        }
    }
}

/// Metadata embedded in every archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveMetadata {
    pub created_at: DateTime<Utc>,
    pub schema_version: u32,
    /// Byte length of the serialized body before any stage ran
    pub raw_size: u64,
    #[serde(rename = "type")]
    pub archive_type: ArchiveType,
    pub compressed: bool,
    pub encrypted: bool,
}

/// Archive payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum ArchiveBody {
    Snapshot(Snapshot),
    Changeset(ChangeSet),
}

/// The document serialized into an archive file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveDocument {
    pub metadata: ArchiveMetadata,
    pub body: ArchiveBody,
}

/// A written archive file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Archive {
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub metadata: ArchiveMetadata,
}
