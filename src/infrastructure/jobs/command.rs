use std::process::{Command, ExitStatus};

use thiserror::Error;

use crate::application::services::retry::RetryPolicy;
use crate::domain::ports::job::{AlertSender, Job};

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` did not finish with a zero exit code ({status})")]
    Failed { program: String, status: ExitStatus },
}

impl CommandError {
    /// Non-zero exits may be transient; a program that cannot start won't be.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// A job whose body is an external program. Output goes straight to the
/// caller's stdout/stderr.
pub struct CommandJob {
    name: String,
    program: String,
    args: Vec<String>,
    retry: Option<RetryPolicy<CommandError>>,
}

impl CommandJob {
    pub fn new(name: impl Into<String>, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
            retry: None,
        }
    }

    /// Re-run the program on non-zero exit according to `policy`.
    #[must_use]
    pub fn with_retry(mut self, policy: RetryPolicy<CommandError>) -> Self {
        self.retry = Some(policy);
        self
    }

    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn execute(&self) -> Result<(), CommandError> {
        tracing::debug!("Running: {}", self.command_line());
        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|source| CommandError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        tracing::debug!("{} completed with {status}", self.program);
        if status.success() {
            Ok(())
        } else {
            Err(CommandError::Failed {
                program: self.program.clone(),
                status,
            })
        }
    }
}

impl Job for CommandJob {
    type Error = CommandError;

    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, _alerts: &dyn AlertSender) -> Result<(), Self::Error> {
        match self.retry {
            Some(ref policy) => policy.call(|| self.execute()),
            None => self.execute(),
        }
    }
}
