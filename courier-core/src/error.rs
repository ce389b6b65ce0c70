//! Error types for the bot core.
//!
//! [`CourierError`] is the top-level error shared by every crate in the workspace.

use thiserror::Error;

/// Top-level error: update parsing, remote API, routing, handler, transport, storage, config.
#[derive(Error, Debug)]
pub enum CourierError {
    /// A payload is missing a field required at its nesting level.
    #[error("Malformed update at `{path}`: {reason}")]
    MalformedUpdate { path: String, reason: String },

    /// The service answered with `ok: false`.
    #[error("API error [{code}]: {description}")]
    Api { code: i64, description: String },

    #[error("No handler found for update #{update_id}")]
    NoHandlerMatched { update_id: i64 },

    /// Failure raised from inside a handler's `handle`.
    #[error("Handler failed for update #{update_id}: {source}")]
    Handler {
        update_id: i64,
        #[source]
        source: anyhow::Error,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl CourierError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        CourierError::MalformedUpdate {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Builds an [`CourierError::Api`] from an `ok: false` envelope.
    pub fn from_envelope(envelope: &serde_json::Value) -> Self {
        let code = envelope
            .get("error_code")
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        let description = envelope
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown API error")
            .to_string();
        CourierError::Api { code, description }
    }
}

/// Result type for core operations; uses [`CourierError`].
pub type Result<T> = std::result::Result<T, CourierError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_envelope_reads_code_and_description() {
        let err = CourierError::from_envelope(&json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized"
        }));
        match err {
            CourierError::Api { code, description } => {
                assert_eq!(code, 401);
                assert_eq!(description, "Unauthorized");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_envelope_defaults() {
        let err = CourierError::from_envelope(&json!({ "ok": false }));
        assert_eq!(err.to_string(), "API error [0]: Unknown API error");
    }

    #[test]
    fn test_no_handler_message_carries_update_id() {
        let err = CourierError::NoHandlerMatched { update_id: 7 };
        assert_eq!(err.to_string(), "No handler found for update #7");
    }
}
