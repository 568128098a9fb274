//! Pastificio - backoffice for a fresh-pasta shop
//!
//! This library keeps the shop's order and user records, archives them as
//! compressed and optionally encrypted full or incremental backups, and
//! aggregates the orders into sales reports.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Orders, users, snapshots and change sets
//! - `storage`: JSON file storage layer
//! - `crypto`: Argon2id key derivation and AES-256-GCM
//! - `archive`: Snapshot and change-set archives through gzip/encrypt stages
//! - `backup`: Backup directory listing, retention and incremental diffs
//! - `reports`: Daily, weekly, monthly, top-product and category reports
//! - `export`: Report rendering as JSON and CSV
//! - `scheduler`: Recurring backup jobs
//! - `state`: Process-scoped application state
//!
//! # Example
//!
//! ```rust,ignore
//! use pastificio::archive::BackupOptions;
//! use pastificio::state::AppState;
//!
//! let state = AppState::from_env()?;
//! let archive = state.create_backup("manual", &BackupOptions::default())?;
//! let snapshot = state.backups().codec().restore_backup(&archive.filename)?;
//! ```

pub mod archive;
pub mod backup;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod scheduler;
pub mod state;
pub mod storage;

pub use error::PastificioError;
