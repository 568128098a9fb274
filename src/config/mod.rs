//! Configuration module for the pastificio backoffice
//!
//! This module provides configuration management including:
//! - Platform path resolution
//! - Settings persistence
//! - The backup encryption secret

pub mod paths;
pub mod settings;

pub use paths::PastificioPaths;
pub use settings::{backup_secret_from_env, BackupSettings, Settings, BACKUP_KEY_ENV};
