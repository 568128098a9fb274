use anyhow::Result;
use clap::{Parser, Subcommand};

use pastificio::cli::{
    handle_backup_command, handle_order_command, handle_report_command, handle_schedule_command,
    BackupCommands, OrderCommands, ReportCommands, ScheduleCommands,
};
use pastificio::config::BACKUP_KEY_ENV;
use pastificio::state::AppState;

#[derive(Parser)]
#[command(
    name = "pastificio",
    version,
    about = "Backoffice for a fresh-pasta shop",
    long_about = "Pastificio keeps the shop's order records, takes compressed and \
                  encrypted full and incremental backups of them on a weekly/daily \
                  schedule, and produces the sales reports shown on the dashboard."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Backup management commands
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Sales reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Order intake and status tracking
    #[command(subcommand)]
    Order(OrderCommands),

    /// Scheduled backup jobs
    #[command(subcommand)]
    Schedule(ScheduleCommands),

    /// Show current configuration and paths
    Config {
        /// Write the settings in effect to config.json
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut state = AppState::from_env()?;

    match cli.command {
        Some(Commands::Backup(cmd)) => handle_backup_command(&mut state, cmd)?,
        Some(Commands::Report(cmd)) => handle_report_command(&state, cmd)?,
        Some(Commands::Order(cmd)) => handle_order_command(&state, cmd)?,
        Some(Commands::Schedule(cmd)) => handle_schedule_command(state, cmd)?,
        Some(Commands::Config { init }) => {
            let paths = state.paths();
            let settings = state.settings();

            println!("Pastificio Configuration");
            println!("========================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Backup directory: {}", paths.backup_dir().display());
            println!("Temp directory:   {}", paths.temp_dir().display());
            println!();
            println!("Settings:");
            println!("  Retention days:     {}", settings.backup.retention_days);
            println!("  Compression level:  {}", settings.backup.compression_level);
            println!(
                "  Size warning:       {} bytes",
                settings.backup.size_warning_bytes
            );
            println!("  Temp max age:       {} h", settings.backup.temp_max_age_hours);
            println!("  Top products days:  {}", settings.top_products_days);
            println!(
                "  Encryption key:     {}",
                if state.backups().codec().has_secret() {
                    "set"
                } else {
                    "not set"
                }
            );

            if init {
                settings.save(paths)?;
                println!();
                println!("Wrote {}", paths.settings_file().display());
            }
        }
        None => {
            println!("Pastificio - backoffice for a fresh-pasta shop");
            println!();
            println!("Run 'pastificio --help' for usage information.");
            println!("Set {} to enable encrypted backups.", BACKUP_KEY_ENV);
        }
    }

    Ok(())
}
