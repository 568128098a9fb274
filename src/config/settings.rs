//! User settings for the pastificio backoffice
//!
//! Manages backup preferences: retention window, compression level,
//! key-derivation cost and monitoring thresholds. The encryption secret is
//! never persisted here; it comes from the environment.

use serde::{Deserialize, Serialize};

use super::paths::PastificioPaths;
use crate::crypto::key_derivation::KeyDerivationParams;
use crate::crypto::SecureString;
use crate::error::PastificioError;

/// Environment variable holding the backup encryption secret
pub const BACKUP_KEY_ENV: &str = "PASTIFICIO_BACKUP_KEY";

/// Backup pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupSettings {
    /// Non-full archives older than this many days are deleted by cleanup
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Default gzip level for on-demand backups (1-9)
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    /// Aggregate archive size above which the monitor warns
    #[serde(default = "default_size_warning_bytes")]
    pub size_warning_bytes: u64,

    /// Scratch files older than this many hours are swept nightly
    #[serde(default = "default_temp_max_age_hours")]
    pub temp_max_age_hours: u32,

    /// Argon2id cost used to derive archive keys (a fresh salt is drawn per archive)
    #[serde(default)]
    pub key_derivation: KeyDerivationParams,
}

fn default_retention_days() -> u32 {
    7
}

fn default_compression_level() -> u32 {
    6
}

fn default_size_warning_bytes() -> u64 {
    1024 * 1024 * 1024
}

fn default_temp_max_age_hours() -> u32 {
    24
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            compression_level: default_compression_level(),
            size_warning_bytes: default_size_warning_bytes(),
            temp_max_age_hours: default_temp_max_age_hours(),
            key_derivation: KeyDerivationParams::default(),
        }
    }
}

/// User settings for the backoffice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Backup pipeline settings
    #[serde(default)]
    pub backup: BackupSettings,

    /// Currency symbol used in terminal reports
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Trailing window for the top-products report
    #[serde(default = "default_top_products_days")]
    pub top_products_days: u32,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "€".to_string()
}

fn default_top_products_days() -> u32 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            backup: BackupSettings::default(),
            currency_symbol: default_currency(),
            top_products_days: default_top_products_days(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &PastificioPaths) -> Result<Self, PastificioError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                PastificioError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                PastificioError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            settings.validate()?;
            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &PastificioPaths) -> Result<(), PastificioError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            PastificioError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            PastificioError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }

    /// Reject values the backup pipeline cannot work with
    pub fn validate(&self) -> Result<(), PastificioError> {
        if !(1..=9).contains(&self.backup.compression_level) {
            return Err(PastificioError::Config(format!(
                "compression_level must be between 1 and 9, got {}",
                self.backup.compression_level
            )));
        }
        self.backup
            .key_derivation
            .check_cost()
            .map_err(|e| PastificioError::Config(e.to_string()))?;
        if self.top_products_days == 0 {
            return Err(PastificioError::Config(
                "top_products_days must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Read the backup encryption secret from the environment
///
/// Returns `None` when the variable is unset or blank; encryption is then
/// unavailable and requesting it fails with a configuration error.
pub fn backup_secret_from_env() -> Option<SecureString> {
    std::env::var(BACKUP_KEY_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(SecureString::from)
}
