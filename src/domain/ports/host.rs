use crate::domain::entities::diagnostic::HostInfo;

/// Identifies the machine a job runs on, for failure reports.
pub trait HostProbe {
    fn host_info(&self) -> HostInfo;
}
