use std::time::Duration;

use serde_json::{json, Map, Value};

use crate::domain::entities::alert::ChannelEvent;
use crate::domain::ports::channel::{AlertChannel, ChannelError};
use crate::domain::value_objects::alert_level::{AlertLevel, LevelSet};

const CHANNEL: &str = "webhook";

/// Detail keys rendered as a pre-formatted block rather than as fields.
const TRACE_KEYS: [&str; 2] = ["stackFrames", "traceback"];

/// Posts alerts to a chat webhook as a single colored attachment.
///
/// Only WARNING and FAILURE are delivered by default: this channel pages
/// people, it doesn't log routine runs.
pub struct WebhookChannel {
    endpoint: String,
    username: String,
    env_name: String,
    client: reqwest::blocking::Client,
}

impl WebhookChannel {
    /// Creates a channel posting to `endpoint`.
    ///
    /// The HTTP client timeout covers connection, request and response.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::Connection` if the HTTP client cannot be
    /// initialized (e.g. TLS backend failure).
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        env_name: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChannelError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChannelError::Connection {
                channel: CHANNEL.to_string(),
                reason: format!("cannot build HTTP client: {e}"),
            })?;

        Ok(Self {
            endpoint: endpoint.into(),
            username: username.into(),
            env_name: env_name.into(),
            client,
        })
    }

    const fn level_color(level: AlertLevel) -> &'static str {
        match level {
            AlertLevel::Success => "good",
            AlertLevel::Warning => "warning",
            AlertLevel::Failure => "danger",
        }
    }

    fn field(title: &str, value: Value) -> Value {
        json!({ "title": title, "value": value, "short": true })
    }

    fn display_value(value: &Value) -> Value {
        match value {
            Value::String(_) => value.clone(),
            other => Value::String(other.to_string()),
        }
    }

    fn trace_block(value: &Value) -> String {
        let lines = match value {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        format!("```{lines}```")
    }

    /// Builds the JSON body posted for `event`.
    ///
    /// Structured details become extra fields in their own key order, except
    /// trace keys which are joined into a code block.
    #[must_use]
    pub fn build_message(&self, event: &ChannelEvent<'_>) -> Value {
        let mut fields = vec![
            Self::field("source", Value::from(event.source)),
            Self::field("level", Value::from(event.level.as_str())),
            Self::field("environment", Value::from(self.env_name.as_str())),
        ];

        let mut attachment = Map::new();
        attachment.insert("author_name".into(), Value::from(self.username.as_str()));
        attachment.insert(
            "title".into(),
            Value::from(format!("{}: {}", event.level, event.title)),
        );
        attachment.insert("color".into(), Value::from(Self::level_color(event.level)));

        match event.detail.filter(|d| !d.trim().is_empty()) {
            None => {}
            Some(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(detail)) => {
                    let mut trace = None;
                    for (key, value) in &detail {
                        if TRACE_KEYS.contains(&key.as_str()) {
                            if trace.is_none() {
                                trace = Some(value);
                            }
                        } else {
                            fields.push(Self::field(key, Self::display_value(value)));
                        }
                    }
                    if let Some(trace) = trace {
                        attachment.insert("text".into(), Value::from(Self::trace_block(trace)));
                        attachment.insert("mrkdwn_in".into(), json!(["text"]));
                    }
                }
                Ok(Value::Null) => {}
                _ => fields.push(Self::field("detail", Value::from(raw))),
            },
        }

        attachment.insert("fields".into(), Value::Array(fields));

        json!({
            "username": self.username,
            "attachments": [Value::Object(attachment)],
        })
    }
}

impl AlertChannel for WebhookChannel {
    fn kind(&self) -> &'static str {
        CHANNEL
    }

    fn default_levels(&self) -> LevelSet {
        LevelSet::from([AlertLevel::Warning, AlertLevel::Failure])
    }

    fn deliver(&self, event: &ChannelEvent<'_>) -> Result<u64, ChannelError> {
        let payload = self.build_message(event);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .map_err(|source| ChannelError::Http {
                channel: CHANNEL.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Webhook HTTP {status}");
            return Err(ChannelError::Rejected {
                channel: CHANNEL.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(1)
    }
}
