use chrono::{DateTime, Utc};

use crate::application::services::router::AlertRouter;
use crate::domain::entities::alert::{AlertDetail, AlertEvent};
use crate::domain::entities::diagnostic::DiagnosticPayload;
use crate::domain::ports::channel::ChannelError;
use crate::domain::ports::host::HostProbe;
use crate::domain::ports::job::{AlertSender, Job};
use crate::domain::value_objects::alert_level::AlertLevel;

pub const START_TITLE: &str = "Job START";
pub const FINAL_TITLE: &str = "Job FINAL";
pub const FAILURE_TITLE: &str = "Failure during Job";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::Running => write!(f, "running"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Result of one job run. `exit_code` is what the process should exit with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub state: JobState,
    pub exit_code: i32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// What a job body sees of the runner: alerts go out under the job's name,
/// with titles prefixed by the job description.
pub struct JobContext<'a> {
    router: &'a AlertRouter,
    source: &'a str,
    description: &'a str,
}

impl<'a> JobContext<'a> {
    #[must_use]
    pub const fn new(router: &'a AlertRouter, source: &'a str, description: &'a str) -> Self {
        Self {
            router,
            source,
            description,
        }
    }
}

impl AlertSender for JobContext<'_> {
    fn send_alert(
        &self,
        level: AlertLevel,
        title: &str,
        detail: Option<AlertDetail>,
    ) -> Result<usize, ChannelError> {
        let full_title = format!("{}: {title}", self.description);
        self.router
            .dispatch(&AlertEvent::new(self.source, level, full_title, detail))
    }
}

#[derive(Debug)]
enum RunFailure<E> {
    Body(E),
    Alert(ChannelError),
}

/// Drives a job through START, body, then FINAL or FAILURE.
pub struct JobRunner<'a> {
    router: &'a AlertRouter,
    host_probe: &'a dyn HostProbe,
    state: JobState,
}

impl<'a> JobRunner<'a> {
    #[must_use]
    pub fn new(router: &'a AlertRouter, host_probe: &'a dyn HostProbe) -> Self {
        Self {
            router,
            host_probe,
            state: JobState::NotStarted,
        }
    }

    #[must_use]
    pub const fn state(&self) -> JobState {
        self.state
    }

    /// Run `job` once. Errors from the body, or from delivering the START
    /// and FINAL alerts, fail the run; they are reported through a FAILURE
    /// alert and never retried here.
    pub fn run<J: Job>(&mut self, job: &mut J) -> JobOutcome {
        let started_at = Utc::now();
        let source = job.name().to_string();
        let description = job.description();
        let ctx = JobContext::new(self.router, &source, &description);

        self.state = JobState::Running;
        tracing::info!("Job `{source}` started");

        let result = ctx
            .send_alert(AlertLevel::Success, START_TITLE, None)
            .map_err(RunFailure::Alert)
            .and_then(|_| job.run(&ctx).map_err(RunFailure::Body))
            .and_then(|()| {
                ctx.send_alert(AlertLevel::Success, FINAL_TITLE, None)
                    .map_err(RunFailure::Alert)
            });

        let exit_code = match result {
            Ok(_) => {
                self.state = JobState::Succeeded;
                tracing::info!("Job `{source}` finished successfully");
                0
            }
            Err(failure) => {
                self.state = JobState::Failed;
                let host = self.host_probe.host_info();
                let payload = match failure {
                    RunFailure::Body(ref e) => DiagnosticPayload::capture(e, host),
                    RunFailure::Alert(ref e) => DiagnosticPayload::capture(e, host),
                };
                tracing::error!(
                    "Job `{source}` failed: {} ({})",
                    payload.error_message,
                    payload.error_kind
                );
                if let Err(e) = ctx.send_alert(
                    AlertLevel::Failure,
                    FAILURE_TITLE,
                    Some(payload.into_detail()),
                ) {
                    tracing::error!("Failure alert could not be delivered: {e}");
                }
                1
            }
        };

        JobOutcome {
            state: self.state,
            exit_code,
            started_at,
            finished_at: Utc::now(),
        }
    }
}
