use serde_json::{Map, Value};

use crate::domain::value_objects::alert_level::AlertLevel;

/// Optional payload attached to an alert.
///
/// Channels never see this type: the router renders it to text once with
/// [`AlertDetail::to_wire`] and each channel interprets that text itself.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertDetail {
    PlainText(String),
    /// Key/value pairs, kept in insertion order.
    Structured(Map<String, Value>),
}

impl AlertDetail {
    /// Builds a structured payload from ordered key/value pairs.
    pub fn structured<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Structured(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Interprets free-form input: a JSON object becomes a structured
    /// payload, anything else is kept as plain text.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        match serde_json::from_str::<Value>(input) {
            Ok(Value::Object(map)) => Self::Structured(map),
            _ => Self::PlainText(input.to_string()),
        }
    }

    /// Canonical text handed to channels.
    #[must_use]
    pub fn to_wire(&self) -> String {
        match self {
            Self::PlainText(text) => text.clone(),
            Self::Structured(map) => Value::Object(map.clone()).to_string(),
        }
    }
}

impl From<String> for AlertDetail {
    fn from(text: String) -> Self {
        Self::PlainText(text)
    }
}

impl From<&str> for AlertDetail {
    fn from(text: &str) -> Self {
        Self::PlainText(text.to_string())
    }
}

impl From<Map<String, Value>> for AlertDetail {
    fn from(map: Map<String, Value>) -> Self {
        Self::Structured(map)
    }
}

/// One lifecycle or ad hoc event, created once and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub source: String,
    pub level: AlertLevel,
    pub title: String,
    pub detail: Option<AlertDetail>,
}

impl AlertEvent {
    pub fn new(
        source: impl Into<String>,
        level: AlertLevel,
        title: impl Into<String>,
        detail: Option<AlertDetail>,
    ) -> Self {
        Self {
            source: source.into(),
            level,
            title: title.into(),
            detail,
        }
    }
}

/// Borrowed view of an event as a channel receives it, detail already
/// serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelEvent<'a> {
    pub source: &'a str,
    pub level: AlertLevel,
    pub title: &'a str,
    pub detail: Option<&'a str>,
}
