pub mod alert;
pub mod diagnostic;

pub use alert::{AlertDetail, AlertEvent, ChannelEvent};
pub use diagnostic::{DiagnosticPayload, HostInfo};
