//! Error Normalizer — collapses every upstream failure into one human-readable message.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Shown when the external service cannot be reached at all.
pub const BACKEND_DOWN_MESSAGE: &str =
    "Backend server is not running. Please start the Python backend server.";

/// Fields of an upstream error body consulted for a message, in order.
const FAILURE_MESSAGE_FIELDS: &[&str] = &["detail", "error"];

/// A failure reduced to a single message. Never carries a backtrace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct NormalizedError {
    pub message: String,
}

impl NormalizedError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Everything that can go wrong on one call to the external service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Upstream answered with a non-success status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Upstream answered with success but the body was not the expected shape.
    #[error("Malformed backend response: {0}")]
    Protocol(String),

    /// Upstream could not be reached.
    #[error("{0}")]
    Unreachable(String),
}

impl GatewayError {
    pub fn normalize(&self) -> NormalizedError {
        NormalizedError::new(self.to_string())
    }
}

/// Picks the message for a failed upstream response.
///
/// Order: a JSON object's `detail`, then its `error`, then the raw body text,
/// then `fallback`. Any parsed JSON other than `null` without a usable field
/// (an object missing both, a string, number or array) yields `fallback`.
/// Raw text is kept only for bodies that are not JSON, or are `null`.
pub fn failure_message(body: &str, fallback: &str) -> String {
    let text = body.trim();
    if text.is_empty() {
        return fallback.to_string();
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(fields)) => FAILURE_MESSAGE_FIELDS
            .iter()
            .filter_map(|key| fields.get(*key))
            .find_map(describe)
            .unwrap_or_else(|| fallback.to_string()),
        Ok(Value::Null) | Err(_) => text.to_string(),
        Ok(_) => fallback.to_string(),
    }
}

fn describe(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        // e.g. a list of field validation issues
        other => Some(other.to_string()),
    }
}
