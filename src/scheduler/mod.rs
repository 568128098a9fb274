//! Scheduled backup jobs
//!
//! The schedule mirrors a crontab: weekly full backup on Sunday at midnight,
//! incremental backups at midnight on the other days, cleanup at 01:00 and
//! size monitoring every six hours. [`due_jobs`] answers which jobs fire at a
//! given minute; an external timer (cron, systemd) calls `pastificio
//! schedule run` at that minute.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDateTime, Timelike, Weekday};
use clap::ValueEnum;
use log::{error, info};

use crate::archive::{Archive, BackupOptions};
use crate::backup::{sweep_temp_files, SizeReport};
use crate::error::PastificioResult;
use crate::state::{timestamped_name, AppState, DAILY_BACKUP_NAME, FULL_BACKUP_PREFIX};

/// A recurring job
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScheduledJob {
    /// Sunday 00:00: compressed, encrypted full backup at level 9
    WeeklyFull,
    /// Monday to Saturday 00:00: incremental backup
    DailyIncremental,
    /// Every day 01:00: retention cleanup and temp-file sweep
    NightlyCleanup,
    /// Every 6 hours: backup directory size check
    SizeMonitor,
}

impl ScheduledJob {
    pub const ALL: [ScheduledJob; 4] = [
        Self::WeeklyFull,
        Self::DailyIncremental,
        Self::NightlyCleanup,
        Self::SizeMonitor,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::WeeklyFull => "weekly-full",
            Self::DailyIncremental => "daily-incremental",
            Self::NightlyCleanup => "nightly-cleanup",
            Self::SizeMonitor => "size-monitor",
        }
    }

    /// Cron expression of the job
    pub fn cron(&self) -> &'static str {
        match self {
            Self::WeeklyFull => "0 0 * * 0",
            Self::DailyIncremental => "0 0 * * 1-6",
            Self::NightlyCleanup => "0 1 * * *",
            Self::SizeMonitor => "0 */6 * * *",
        }
    }

    /// Whether the job fires at the minute containing `at`
    pub fn is_due(&self, at: NaiveDateTime) -> bool {
        let (hour, minute) = (at.hour(), at.minute());
        let sunday = at.weekday() == Weekday::Sun;
        match self {
            Self::WeeklyFull => sunday && hour == 0 && minute == 0,
            Self::DailyIncremental => !sunday && hour == 0 && minute == 0,
            Self::NightlyCleanup => hour == 1 && minute == 0,
            Self::SizeMonitor => hour % 6 == 0 && minute == 0,
        }
    }
}

impl fmt::Display for ScheduledJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Jobs that fire at the minute containing `at`
pub fn due_jobs(at: NaiveDateTime) -> Vec<ScheduledJob> {
    ScheduledJob::ALL
        .into_iter()
        .filter(|job| job.is_due(at))
        .collect()
}

/// Result of a job run
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Archived(Archive),
    NoChanges,
    Cleaned { backups: usize, temp_files: usize },
    Size(SizeReport),
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Archived(archive) => write!(f, "wrote {}", archive.filename),
            Self::NoChanges => write!(f, "no changes since the last backup"),
            Self::Cleaned {
                backups,
                temp_files,
            } => write!(
                f,
                "deleted {} old backups and {} temp files",
                backups, temp_files
            ),
            Self::Size(report) => write!(
                f,
                "{} archives, {:.2} MB{}",
                report.archive_count,
                report.total_bytes as f64 / 1024.0 / 1024.0,
                if report.over_threshold {
                    " (over threshold)"
                } else {
                    ""
                }
            ),
        }
    }
}

/// Run `job`, propagating failures
pub fn execute(state: &AppState, job: ScheduledJob) -> PastificioResult<JobOutcome> {
    let backup = &state.settings().backup;

    match job {
        ScheduledJob::WeeklyFull => {
            let archive = state.create_backup(
                &timestamped_name(FULL_BACKUP_PREFIX),
                &BackupOptions::weekly_full(),
            )?;
            Ok(JobOutcome::Archived(archive))
        }
        ScheduledJob::DailyIncremental => Ok(match state.create_incremental(DAILY_BACKUP_NAME)? {
            Some(archive) => JobOutcome::Archived(archive),
            None => JobOutcome::NoChanges,
        }),
        ScheduledJob::NightlyCleanup => {
            let backups = state.backups().cleanup_old_backups()?;
            let temp_files = sweep_temp_files(
                &state.paths().temp_dir(),
                Duration::hours(i64::from(backup.temp_max_age_hours)),
            );
            Ok(JobOutcome::Cleaned {
                backups,
                temp_files,
            })
        }
        ScheduledJob::SizeMonitor => {
            let report = state.backups().check_size(backup.size_warning_bytes)?;
            info!(
                "Total backup size: {:.2} MB",
                report.total_bytes as f64 / 1024.0 / 1024.0
            );
            Ok(JobOutcome::Size(report))
        }
    }
}

/// Run `job` once; a failure is logged and not retried
pub fn run_job(state: &AppState, job: ScheduledJob) -> Option<JobOutcome> {
    info!("Starting job {}", job);
    match execute(state, job) {
        Ok(outcome) => {
            info!("Job {} finished: {}", job, outcome);
            Some(outcome)
        }
        Err(e) => {
            error!("Job {} failed: {}", job, e);
            None
        }
    }
}
