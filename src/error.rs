//! Error types for the widget runtime
//!
//! None of these are fatal to a host page. Attribute and decode errors are
//! logged and absorbed where they occur; transport errors drive the reconnect
//! loop. They exist as types so each failure class is logged consistently and
//! can be asserted on in tests.

use thiserror::Error;

/// Top-level widget runtime error
#[derive(Debug, Error)]
pub enum WidgetError {
    /// A tag was mounted that nobody registered
    #[error("no custom element registered for <{0}>")]
    UnknownElement(String),

    /// The page has no element with this id
    #[error("no mounted element with id {0}")]
    UnknownInstance(u64),

    /// Attribute name would not survive serialization into markup
    #[error("invalid attribute name {0:?}")]
    InvalidAttributeName(String),

    /// Attribute value could not be converted to its semantic type
    #[error("attribute `{name}`: {reason} (got {value:?})")]
    AttributeParse {
        name: String,
        value: String,
        reason: String,
    },
}

/// Theme file could not be used
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("failed to parse theme: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("theme token `{token}` has an invalid value {value:?}")]
    InvalidValue { token: String, value: String },
}

/// WebSocket connection failure
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connecting to {url} failed: {reason}")]
    Connect { url: String, reason: String },

    #[error("connecting to {url} timed out")]
    Timeout { url: String },

    #[error("socket error: {0}")]
    Socket(String),
}

/// Inbound frame could not be decoded
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed JSON frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary frame is not valid UTF-8")]
    NotUtf8,

    #[error("`{kind}` frame does not match its schema: {reason}")]
    Schema { kind: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_messages() {
        let timeout = TransportError::Timeout {
            url: "ws://feed".to_string(),
        };
        assert_eq!(timeout.to_string(), "connecting to ws://feed timed out");

        let name = WidgetError::InvalidAttributeName("a>b".to_string());
        assert_eq!(name.to_string(), "invalid attribute name \"a>b\"");
    }
}
