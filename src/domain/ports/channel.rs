use thiserror::Error;

use crate::domain::entities::alert::ChannelEvent;
use crate::domain::value_objects::alert_level::LevelSet;

#[derive(Error, Debug)]
pub enum ChannelError {
    /// Connection or statement failure from the database sink, unmodified.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
    #[error("channel `{channel}` could not connect: {reason}")]
    Connection { channel: String, reason: String },
    #[error("channel `{channel}` request failed: {source}")]
    Http {
        channel: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("channel `{channel}` rejected the alert with HTTP {status}")]
    Rejected { channel: String, status: u16 },
    #[error("alert payload could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A delivery target for alert events.
///
/// Level filtering is done by the router before `deliver` is called; a
/// channel only decides which levels it watches by default and how an
/// event is formatted on its wire.
pub trait AlertChannel: Send {
    /// Short label used in logs.
    fn kind(&self) -> &'static str;

    /// Levels this channel delivers until told otherwise.
    fn default_levels(&self) -> LevelSet {
        LevelSet::all()
    }

    /// Deliver one event.
    ///
    /// Returns the number of records written (rows inserted, messages posted).
    ///
    /// # Errors
    ///
    /// Returns `ChannelError` if the sink cannot be reached or refuses the event.
    fn deliver(&self, event: &ChannelEvent<'_>) -> Result<u64, ChannelError>;
}

impl<C: AlertChannel + ?Sized> AlertChannel for Box<C> {
    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn default_levels(&self) -> LevelSet {
        (**self).default_levels()
    }

    fn deliver(&self, event: &ChannelEvent<'_>) -> Result<u64, ChannelError> {
        (**self).deliver(event)
    }
}
