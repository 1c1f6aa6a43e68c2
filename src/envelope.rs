//! Canonical message envelope and normalization of user input (§3, §6).
//!
//! Payload is JSON-only: no object references or functions, so every
//! envelope is wire-safe by construction. Unknown fields on an incoming
//! envelope are preserved via `#[serde(flatten)]` so the core can forward a
//! message it doesn't fully understand without dropping data (§6).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Layer 3: Internal module imports
use crate::address::Address;

/// Current wire format version stamped onto normalized envelopes.
pub const ENVELOPE_VERSION: &str = "1.0.0";

/// The canonical message record (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<Address>,
    #[serde(rename = "correlationId", skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    pub timestamp: i64,
    pub version: String,
    /// Fields neither this type nor its producer's schema knows about, kept
    /// so a forwarded envelope loses nothing (§6).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    /// Builds an already-normalized envelope (used internally by the
    /// executor and system when constructing messages, e.g. emitted events).
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
            sender: None,
            correlation_id: None,
            timestamp: Utc::now().timestamp_millis(),
            version: ENVELOPE_VERSION.to_string(),
            extra: Map::new(),
        }
    }

    pub fn with_sender(mut self, sender: Address) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Normalizes arbitrary user-supplied JSON into a full envelope: `type`
    /// is required (parse error otherwise); `timestamp`, `version` and
    /// `payload = null` are stamped on if absent (§3, §4.6).
    pub fn normalize(input: Value) -> Result<Self, NormalizeError> {
        let mut obj = match input {
            Value::Object(map) => map,
            _ => return Err(NormalizeError::NotAnObject),
        };

        let kind = obj
            .remove("type")
            .and_then(|v| v.as_str().map(str::to_string))
            .ok_or(NormalizeError::MissingType)?;

        let payload = obj.remove("payload").unwrap_or(Value::Null);
        let sender = match obj.remove("sender") {
            Some(v) => {
                Some(serde_json::from_value(v).map_err(|_| NormalizeError::InvalidSender)?)
            }
            None => None,
        };
        let correlation_id = obj
            .remove("correlationId")
            .and_then(|v| v.as_str().map(str::to_string));
        let timestamp = obj
            .remove("timestamp")
            .and_then(|v| v.as_i64())
            .unwrap_or_else(|| Utc::now().timestamp_millis());
        let version = obj
            .remove("version")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| ENVELOPE_VERSION.to_string());

        Ok(Self {
            kind,
            payload,
            sender,
            correlation_id,
            timestamp,
            version,
            extra: obj,
        })
    }

    /// Convenience constructor from a `{type, payload?}`-shaped literal,
    /// used pervasively by `ActorRef::send`/`ask` callers.
    pub fn from_type_payload(kind: impl Into<String>, payload: Value) -> Self {
        Self::new(kind, payload)
    }
}

/// Errors normalizing arbitrary JSON into an [`Envelope`].
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("envelope must be a JSON object")]
    NotAnObject,
    #[error("envelope is missing required field `type`")]
    MissingType,
    #[error("envelope `sender` field is not a valid address")]
    InvalidSender,
}
