//! CLI commands for reports
//!
//! Each report renders for the terminal by default, or as JSON or CSV into
//! a file or standard output.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use chrono::Datelike;
use clap::{Args, Subcommand};

use super::date_or_today;
use crate::error::{PastificioError, PastificioResult};
use crate::export::{export_report, ExportFormat};
use crate::reports::{
    CategoryReport, DailyReport, MonthlyReport, ReportResult, TopProductsReport, WeeklyReport,
};
use crate::state::AppState;

/// Output options shared by every report
#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Terminal)]
    pub format: ExportFormat,

    /// Write to a file instead of standard output
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Orders and revenue for one pickup day
    Daily {
        /// Pickup date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Orders per weekday for the Sunday-Saturday week containing a date
    Weekly {
        /// Any date in the week (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Daily breakdown and trend for one month
    Monthly {
        /// Year (default: current)
        #[arg(long)]
        year: Option<i32>,

        /// Month 1-12 (default: current)
        #[arg(long)]
        month: Option<u32>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Best-selling products over a trailing window
    #[command(alias = "top")]
    TopProducts {
        /// Window in days (default from settings)
        #[arg(long)]
        days: Option<u32>,

        /// Show top N products only
        #[arg(long)]
        limit: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Quantity and value per product category for one pickup day
    Categories {
        /// Pickup date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Build the report a command asks for
pub fn build_report(state: &AppState, cmd: &ReportCommands) -> PastificioResult<ReportResult> {
    let orders = state.storage().orders.get_all()?;

    Ok(match cmd {
        ReportCommands::Daily { date, .. } => {
            ReportResult::Daily(DailyReport::generate(&orders, date_or_today(date.as_deref())?))
        }
        ReportCommands::Weekly { date, .. } => ReportResult::Weekly(WeeklyReport::generate(
            &orders,
            date_or_today(date.as_deref())?,
        )),
        ReportCommands::Monthly { year, month, .. } => {
            let today = chrono::Local::now().date_naive();
            ReportResult::Monthly(MonthlyReport::generate(
                &orders,
                year.unwrap_or(today.year()),
                month.unwrap_or(today.month()),
            )?)
        }
        ReportCommands::TopProducts { days, limit, .. } => {
            let today = chrono::Local::now().date_naive();
            let days = days.unwrap_or(state.settings().top_products_days);
            let mut report = TopProductsReport::generate(&orders, today, days)?;
            if let Some(limit) = limit {
                report.products.truncate(*limit);
            }
            ReportResult::TopProducts(report)
        }
        ReportCommands::Categories { date, .. } => ReportResult::Categories(
            CategoryReport::generate(&orders, date_or_today(date.as_deref())?),
        ),
    })
}

fn output_args(cmd: &ReportCommands) -> &OutputArgs {
    match cmd {
        ReportCommands::Daily { output, .. }
        | ReportCommands::Weekly { output, .. }
        | ReportCommands::Monthly { output, .. }
        | ReportCommands::TopProducts { output, .. }
        | ReportCommands::Categories { output, .. } => output,
    }
}

/// Handle report commands
pub fn handle_report_command(state: &AppState, cmd: ReportCommands) -> PastificioResult<()> {
    let report = build_report(state, &cmd)?;
    let OutputArgs { format, output } = output_args(&cmd);

    if let Some(path) = output {
        let file = File::create(path).map_err(|e| {
            PastificioError::Export(format!("Failed to create file {}: {}", path.display(), e))
        })?;
        let mut writer = BufWriter::new(file);
        export_report(&report, *format, &mut writer)?;
        writer
            .flush()
            .map_err(|e| PastificioError::Export(e.to_string()))?;
        println!("Report exported to: {}", path.display());
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        export_report(&report, *format, &mut handle)?;
    }

    Ok(())
}
