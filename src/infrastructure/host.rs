use sysinfo::System;

use crate::domain::entities::diagnostic::HostInfo;
use crate::domain::ports::host::HostProbe;

const UNKNOWN: &str = "unknown";

/// Reads the host name and OS from the running system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHostProbe;

impl HostProbe for SystemHostProbe {
    fn host_info(&self) -> HostInfo {
        HostInfo {
            host: System::host_name()
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            os: System::long_os_version()
                .or_else(System::name)
                .filter(|os| !os.is_empty())
                .unwrap_or_else(|| std::env::consts::OS.to_string()),
        }
    }
}
