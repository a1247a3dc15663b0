//! Protocol-level errors shared by Engine and Player.

use thiserror::Error;

/// Failure to turn a frame into (or out of) a typed envelope.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame is not valid JSON or not an envelope object
    #[error("Malformed frame: {0}")]
    Malformed(String),

    /// Recognized message type without a `data` object
    #[error("Message `{kind}` carries no data")]
    MissingData { kind: String },

    /// Recognized message type whose payload is missing or has bad fields
    #[error("Message `{kind}` has an invalid payload: {reason}")]
    InvalidPayload { kind: String, reason: String },

    /// A single value failed validation
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Outbound envelope could not be serialized
    #[error("Failed to encode message: {0}")]
    Encode(String),
}

impl ProtocolError {
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
