use anyhow::bail;
use colored::Colorize;

use crate::application::config::AppConfig;
use crate::application::services::retry::RetryPolicy;
use crate::application::services::router::AlertRouter;
use crate::application::services::runner::{JobOutcome, JobRunner, JobState};
use crate::domain::ports::host::HostProbe;
use crate::infrastructure::jobs::command::{CommandError, CommandJob};

/// Build the command job described on the command line.
///
/// `retries` extra attempts are made on non-zero exit, spaced by the
/// environment's retry delay and backoff.
///
/// # Errors
///
/// Returns an error if `command` is empty.
pub fn build_command_job(
    config: &AppConfig,
    name: Option<String>,
    retries: u32,
    command: Vec<String>,
) -> anyhow::Result<CommandJob> {
    let mut parts = command.into_iter();
    let Some(program) = parts.next() else {
        bail!("No program given to run");
    };
    let name = name.unwrap_or_else(|| program.clone());
    let job = CommandJob::new(name, program, parts.collect());

    if retries == 0 {
        return Ok(job);
    }

    let policy =
        RetryPolicy::from_config_matching(&config.settings.retry, CommandError::is_retryable)
            .tries(retries.saturating_add(1))
            .on_retry(|e, remaining, delay| {
                tracing::warn!("{e}; {} attempts left, retrying in {delay:?}", remaining - 1);
            });
    Ok(job.with_retry(policy))
}

/// Run `job` through the alert lifecycle and print a one-line summary.
///
/// The caller is responsible for exiting with `outcome.exit_code`.
pub fn run_job(router: &AlertRouter, host: &dyn HostProbe, job: &mut CommandJob) -> JobOutcome {
    let mut runner = JobRunner::new(router, host);
    let outcome = runner.run(job);
    let elapsed = outcome.finished_at - outcome.started_at;

    match outcome.state {
        JobState::Succeeded => println!(
            "{} {} finished in {}ms",
            "✓".green().bold(),
            job.command_line(),
            elapsed.num_milliseconds()
        ),
        _ => eprintln!(
            "{} {} failed after {}ms (exit {})",
            "✗".red().bold(),
            job.command_line(),
            elapsed.num_milliseconds(),
            outcome.exit_code
        ),
    }
    outcome
}
