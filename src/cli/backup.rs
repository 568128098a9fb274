//! Backup CLI commands
//!
//! Implements CLI commands for backup management.

use std::path::Path;

use chrono::Utc;
use clap::Subcommand;

use super::ensure_secret;
use crate::archive::{ArchiveType, BackupOptions, ENCRYPT_SUFFIX};
use crate::backup::BackupInfo;
use crate::display::{format_backup_details, format_backup_list, format_size};
use crate::error::{PastificioError, PastificioResult};
use crate::state::{timestamped_name, AppState, DAILY_BACKUP_NAME};

/// Base name of on-demand full backups
const MANUAL_BACKUP_PREFIX: &str = "backup";

/// Base name of the safety backup taken before a restore is applied
const PRE_RESTORE_PREFIX: &str = "pre-restore";

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a new backup
    Create {
        /// Archive base name (default: timestamped)
        #[arg(short, long)]
        name: Option<String>,

        /// Write only the changes since the last full backup
        #[arg(long, conflicts_with_all = ["no_compress", "encrypt", "level"])]
        incremental: bool,

        /// Skip gzip compression
        #[arg(long)]
        no_compress: bool,

        /// Encrypt the archive
        #[arg(long)]
        encrypt: bool,

        /// Gzip level (1-9)
        #[arg(short, long)]
        level: Option<u32>,
    },

    /// List all available backups
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Restore from a backup
    Restore {
        /// Backup filename (use 'latest' for most recent)
        backup: String,

        /// Overwrite the current records with the backup
        #[arg(long)]
        apply: bool,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show information about a specific backup
    Info {
        /// Backup filename (use 'latest' for most recent)
        backup: String,
    },

    /// Delete non-full backups older than the retention window
    Cleanup,

    /// Show the total size of the backup directory
    Size,
}

/// Handle a backup command
pub fn handle_backup_command(state: &mut AppState, cmd: BackupCommands) -> PastificioResult<()> {
    match cmd {
        BackupCommands::Create {
            name,
            incremental,
            no_compress,
            encrypt,
            level,
        } => {
            if incremental {
                ensure_secret(state)?;
                let base_name = name.unwrap_or_else(|| DAILY_BACKUP_NAME.to_string());
                match state.create_incremental(&base_name)? {
                    Some(archive) => {
                        println!("Incremental backup created: {}", archive.filename);
                        println!("Location: {}", archive.path.display());
                    }
                    None => println!("No changes since the last backup; nothing written."),
                }
                return Ok(());
            }

            if encrypt {
                ensure_secret(state)?;
            }
            let options = BackupOptions {
                archive_type: ArchiveType::Full,
                compress: !no_compress,
                encrypt,
                compression_level: level.unwrap_or(state.backups().compression_level()),
            };
            let base_name = name.unwrap_or_else(|| timestamped_name(MANUAL_BACKUP_PREFIX));

            println!("Creating backup...");
            let archive = state.create_backup(&base_name, &options)?;
            println!("Backup created: {}", archive.filename);
            println!("Location: {}", archive.path.display());
            println!("Size: {}", format_size(archive.size_bytes));
        }

        BackupCommands::List { verbose } => {
            let backups = state.backups().list_backups()?;
            println!("{}", format_backup_list(&backups, verbose, Utc::now()));
            if backups.is_empty() {
                println!("Create one with: pastificio backup create");
            }
        }

        BackupCommands::Restore {
            backup,
            apply,
            force,
        } => {
            let info = resolve_backup(state, &backup)?;
            if info.filename.ends_with(ENCRYPT_SUFFIX) {
                ensure_secret(state)?;
            }

            let snapshot = state.backups().codec().restore_backup(&info.filename)?;

            println!("Backup Information");
            println!("==================");
            println!("File: {}", info.path.display());
            println!(
                "Captured: {}",
                snapshot.captured_at().format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Schema version: {}", snapshot.schema_version());
            for collection in snapshot.collections() {
                println!(
                    "  {:<8} {} record(s)",
                    collection.kind().as_str(),
                    collection.len()
                );
            }
            println!();

            if !apply {
                println!("Backup is valid. To overwrite the current records, run:");
                println!("  pastificio backup restore {} --apply --force", backup);
                return Ok(());
            }

            if !force {
                println!("WARNING: This will overwrite ALL current orders and users!");
                println!("To proceed, run again with --force flag:");
                println!("  pastificio backup restore {} --apply --force", backup);
                return Ok(());
            }

            println!("Creating backup of current data before restore...");
            let safety = state.create_backup(
                &timestamped_name(PRE_RESTORE_PREFIX),
                &BackupOptions::default(),
            )?;
            println!("Pre-restore backup saved: {}", safety.filename);

            let restored = state.restore_into_storage(&info.filename)?;
            println!("Restore complete: {} record(s).", restored.record_count());
        }

        BackupCommands::Info { backup } => {
            let info = resolve_backup(state, &backup)?;
            if info.filename.ends_with(ENCRYPT_SUFFIX) {
                ensure_secret(state)?;
            }
            let document = state.backups().codec().read_archive(&info.filename)?;
            print!("{}", format_backup_details(&info, &document));
        }

        BackupCommands::Cleanup => {
            let backups = state.backups().list_backups()?;
            if backups.iter().any(|b| b.filename.ends_with(ENCRYPT_SUFFIX)) {
                ensure_secret(state)?;
            }
            let deleted = state.backups().cleanup_old_backups()?;
            println!(
                "Deleted {} backup(s) older than {} days.",
                deleted,
                state.backups().retention_days()
            );
        }

        BackupCommands::Size => {
            let threshold = state.settings().backup.size_warning_bytes;
            let report = state.backups().check_size(threshold)?;
            println!(
                "{} archive(s), {} total",
                report.archive_count,
                format_size(report.total_bytes)
            );
            if report.over_threshold {
                println!("WARNING: above the {} threshold", format_size(threshold));
            }
        }
    }

    Ok(())
}

/// Resolve a backup argument to a listed archive
fn resolve_backup(state: &AppState, backup: &str) -> PastificioResult<BackupInfo> {
    if backup.eq_ignore_ascii_case("latest") {
        return state
            .backups()
            .list_backups()?
            .into_iter()
            .next()
            .ok_or_else(|| PastificioError::backup_not_found("latest"));
    }

    // Accept a path into the backup directory as well as a bare filename
    let filename = Path::new(backup)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(backup);

    state
        .backups()
        .get_backup(filename)?
        .ok_or_else(|| PastificioError::backup_not_found(filename))
}
