//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the application state.

pub mod backup;
pub mod order;
pub mod report;
pub mod schedule;

pub use backup::{handle_backup_command, BackupCommands};
pub use order::{handle_order_command, OrderCommands};
pub use report::{handle_report_command, ReportCommands};
pub use schedule::{handle_schedule_command, ScheduleCommands};

use chrono::NaiveDate;

use crate::config::BACKUP_KEY_ENV;
use crate::crypto::SecureString;
use crate::error::{PastificioError, PastificioResult};
use crate::state::AppState;

/// Parse a `YYYY-MM-DD` date argument
pub(crate) fn parse_date(value: &str) -> PastificioResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        PastificioError::Validation(format!("Invalid date format: {}. Use YYYY-MM-DD", value))
    })
}

/// Parse an optional date argument, defaulting to today
pub(crate) fn date_or_today(value: Option<&str>) -> PastificioResult<NaiveDate> {
    match value {
        Some(v) => parse_date(v),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// Make sure the backup store has a secret, prompting for one if needed
pub(crate) fn ensure_secret(state: &mut AppState) -> PastificioResult<()> {
    if state.backups().codec().has_secret() {
        return Ok(());
    }

    let passphrase = rpassword::prompt_password("Backup passphrase: ").map_err(|e| {
        PastificioError::Config(format!(
            "No {} set and the passphrase could not be read: {}",
            BACKUP_KEY_ENV, e
        ))
    })?;
    if passphrase.trim().is_empty() {
        return Err(PastificioError::Config("Backup passphrase is empty".into()));
    }

    state.set_secret(SecureString::new(passphrase));
    Ok(())
}
