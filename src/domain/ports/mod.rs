pub mod channel;
pub mod connection;
pub mod host;
pub mod job;

pub use channel::{AlertChannel, ChannelError};
pub use connection::ConnectionProvider;
pub use host::HostProbe;
pub use job::{AlertSender, Job};
