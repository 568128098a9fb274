//! Export module for the pastificio backoffice
//!
//! Renders a [`ReportResult`] for the terminal, as JSON (machine-readable,
//! wrapped with export metadata) or as CSV (spreadsheet-compatible).

use std::io::Write;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;

use crate::error::{PastificioError, PastificioResult};
use crate::reports::ReportResult;

/// Output format of a rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ExportFormat {
    #[default]
    Terminal,
    Json,
    Csv,
}

/// JSON export envelope
#[derive(Debug, Clone, Serialize)]
pub struct ReportExport<'a> {
    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: &'static str,

    pub report_type: &'static str,

    pub report: &'a ReportResult,
}

impl<'a> ReportExport<'a> {
    pub fn new(report: &'a ReportResult) -> Self {
        Self {
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION"),
            report_type: report_type(report),
            report,
        }
    }
}

fn report_type(report: &ReportResult) -> &'static str {
    match report {
        ReportResult::Daily(_) => "daily",
        ReportResult::Weekly(_) => "weekly",
        ReportResult::Monthly(_) => "monthly",
        ReportResult::TopProducts(_) => "top-products",
        ReportResult::Categories(_) => "categories",
    }
}

/// Write `report` to `writer` in `format`
pub fn export_report<W: Write>(
    report: &ReportResult,
    format: ExportFormat,
    writer: &mut W,
) -> PastificioResult<()> {
    match format {
        ExportFormat::Terminal => writer
            .write_all(report.format_terminal().as_bytes())
            .map_err(|e| PastificioError::Export(e.to_string())),
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, &ReportExport::new(report))
                .map_err(|e| PastificioError::Export(e.to_string()))?;
            writeln!(writer).map_err(|e| PastificioError::Export(e.to_string()))
        }
        ExportFormat::Csv => report.export_csv(writer),
    }
}
