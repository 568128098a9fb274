//! Path management for the pastificio backoffice
//!
//! ## Path Resolution Order
//!
//! 1. `PASTIFICIO_DATA_DIR` environment variable (if set)
//! 2. The platform config directory from `directories` (e.g.
//!    `~/.config/pastificio` on Linux, `%APPDATA%\pastificio` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::PastificioError;

/// Manages all paths used by the backoffice
#[derive(Debug, Clone)]
pub struct PastificioPaths {
    /// Base directory for all data
    base_dir: PathBuf,
}

impl PastificioPaths {
    /// Create a new PastificioPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no platform config directory can be determined.
    pub fn new() -> Result<Self, PastificioError> {
        let base_dir = if let Ok(custom) = std::env::var("PASTIFICIO_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create PastificioPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (`<base>/data/`)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the backup directory (`<base>/backups/`)
    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Get the scratch directory swept by the nightly cleanup (`<base>/tmp/`)
    pub fn temp_dir(&self) -> PathBuf {
        self.base_dir.join("tmp")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to orders.json
    pub fn orders_file(&self) -> PathBuf {
        self.data_dir().join("orders.json")
    }

    /// Get the path to users.json
    pub fn users_file(&self) -> PathBuf {
        self.data_dir().join("users.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), PastificioError> {
        for (dir, label) in [
            (self.base_dir.clone(), "base"),
            (self.data_dir(), "data"),
            (self.backup_dir(), "backup"),
            (self.temp_dir(), "temp"),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                PastificioError::Io(format!("Failed to create {} directory: {}", label, e))
            })?;
        }

        Ok(())
    }
}

fn resolve_default_path() -> Result<PathBuf, PastificioError> {
    ProjectDirs::from("", "", "pastificio")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| PastificioError::Config("Could not determine a config directory".into()))
}
