use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::alert::AlertDetail;

/// Where the failing job ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    pub host: String,
    pub os: String,
}

/// Structured failure record carried by a FAILURE alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticPayload {
    pub error_kind: String,
    pub error_message: String,
    pub host: String,
    pub os: String,
    pub stack_frames: Vec<String>,
}

impl DiagnosticPayload {
    /// Builds the record for `error`, whose static type is `E`.
    ///
    /// Frames are the error's source chain, outermost first.
    pub fn capture<E>(error: &E, host: HostInfo) -> Self
    where
        E: std::error::Error + 'static,
    {
        let mut stack_frames = Vec::new();
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(error);
        let mut depth = 0usize;
        while let Some(err) = current {
            stack_frames.push(format!("#{depth} {err}"));
            current = err.source();
            depth += 1;
        }

        Self {
            error_kind: short_type_name::<E>().to_string(),
            error_message: error.to_string(),
            host: host.host,
            os: host.os,
            stack_frames,
        }
    }

    #[must_use]
    pub fn into_detail(self) -> AlertDetail {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => AlertDetail::Structured(map),
            // A struct of strings always serializes to an object.
            Ok(other) => AlertDetail::PlainText(other.to_string()),
            Err(e) => AlertDetail::PlainText(e.to_string()),
        }
    }
}

/// Last path segment of a type name, without generic arguments.
#[must_use]
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
