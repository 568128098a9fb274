//! Scheduler CLI commands
//!
//! `schedule run` is meant to be called every minute by an external timer;
//! `schedule shutdown` belongs in the service stop hook.

use chrono::NaiveDateTime;
use clap::Subcommand;

use crate::error::{PastificioError, PastificioResult};
use crate::scheduler::{due_jobs, run_job, ScheduledJob};
use crate::state::AppState;

/// Schedule subcommands
#[derive(Subcommand)]
pub enum ScheduleCommands {
    /// List the recurring jobs and their cron expressions
    List,

    /// Show which jobs fire at a given minute
    Due {
        /// Local time (YYYY-MM-DDTHH:MM, default: now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Run one job, or every job due now
    Run {
        /// Job to run regardless of the clock
        #[arg(short, long, value_enum)]
        job: Option<ScheduledJob>,

        /// Local time used to pick due jobs (YYYY-MM-DDTHH:MM, default: now)
        #[arg(long, conflicts_with = "job")]
        at: Option<String>,
    },

    /// Save the records and take the shutdown backup
    Shutdown,
}

fn parse_at(value: Option<&str>) -> PastificioResult<NaiveDateTime> {
    let Some(value) = value else {
        return Ok(chrono::Local::now().naive_local());
    };

    ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| {
            PastificioError::Validation(format!(
                "Invalid time format: {}. Use YYYY-MM-DDTHH:MM",
                value
            ))
        })
}

/// Handle a schedule command
pub fn handle_schedule_command(state: AppState, cmd: ScheduleCommands) -> PastificioResult<()> {
    match cmd {
        ScheduleCommands::List => {
            for job in ScheduledJob::ALL {
                println!("{:<12} {}", job.cron(), job);
            }
        }

        ScheduleCommands::Due { at } => {
            let at = parse_at(at.as_deref())?;
            let jobs = due_jobs(at);
            if jobs.is_empty() {
                println!("No jobs due at {}", at.format("%Y-%m-%d %H:%M"));
            }
            for job in jobs {
                println!("{}", job);
            }
        }

        ScheduleCommands::Run { job, at } => {
            let jobs = match job {
                Some(job) => vec![job],
                None => due_jobs(parse_at(at.as_deref())?),
            };

            for job in jobs {
                match run_job(&state, job) {
                    Some(outcome) => println!("{}: {}", job, outcome),
                    None => println!("{}: failed (see log)", job),
                }
            }
        }

        ScheduleCommands::Shutdown => match state.shutdown()? {
            Some(archive) => println!("Shutdown backup: {}", archive.filename),
            None => println!("Records saved; shutdown backup failed (see log)"),
        },
    }

    Ok(())
}
