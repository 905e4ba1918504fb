use crate::domain::entities::alert::AlertDetail;
use crate::domain::ports::channel::ChannelError;
use crate::domain::value_objects::alert_level::AlertLevel;

/// Lets a running job body raise its own alerts through the job's router.
pub trait AlertSender {
    /// Send an ad hoc alert on behalf of the running job.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError` if a channel fails to deliver.
    fn send_alert(
        &self,
        level: AlertLevel,
        title: &str,
        detail: Option<AlertDetail>,
    ) -> Result<usize, ChannelError>;
}

/// A unit of batch work driven by the job runner.
pub trait Job {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Identifier reported as the `source` of every event.
    fn name(&self) -> &str;

    /// Prefix for event titles.
    fn description(&self) -> String {
        format!("{} processing", self.name())
    }

    /// The job body.
    ///
    /// # Errors
    ///
    /// Any error is terminal for the run and is reported as a FAILURE alert.
    fn run(&mut self, alerts: &dyn AlertSender) -> Result<(), Self::Error>;
}
