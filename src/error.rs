//! Relay error types.
//!
//! [`RelayError`] is the central error type for the relay. None of its
//! variants reach a client: inbound and delivery failures are logged and
//! dropped, and only configuration errors stop the process at startup.

use crate::domain::ConnectionId;

/// Server-side error enum.
///
/// | Variant              | Raised by                          | Outcome                  |
/// |----------------------|------------------------------------|--------------------------|
/// | `MalformedFrame`     | inbound frame parsing              | frame dropped            |
/// | `Serialization`      | outbound frame encoding            | broadcast skipped        |
/// | `ConnectionNotFound` | registry lookup of a stale id      | event dropped            |
/// | `ChannelClosed`      | delivery to one recipient          | recipient skipped        |
/// | `InvalidConfig`      | configuration loading              | startup aborted          |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Inbound frame is not JSON or does not match its declared shape.
    #[error("malformed frame: {0}")]
    MalformedFrame(#[source] serde_json::Error),

    /// Outbound event could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No live connection with the given id.
    #[error("connection not found: {0}")]
    ConnectionNotFound(ConnectionId),

    /// The recipient's outbound channel is closed.
    #[error("channel closed")]
    ChannelClosed,

    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RelayError {
    /// Returns a short, stable label for structured logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MalformedFrame(_) => "malformed_frame",
            Self::Serialization(_) => "serialization",
            Self::ConnectionNotFound(_) => "connection_not_found",
            Self::ChannelClosed => "channel_closed",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_labels() {
        assert_eq!(RelayError::ChannelClosed.kind(), "channel_closed");
        assert_eq!(
            RelayError::InvalidConfig("PORT".to_string()).kind(),
            "invalid_config"
        );
        assert_eq!(
            RelayError::ConnectionNotFound(ConnectionId::new()).kind(),
            "connection_not_found"
        );
    }

    #[test]
    fn display_includes_id() {
        let id = ConnectionId::new();
        let err = RelayError::ConnectionNotFound(id);
        assert_eq!(err.to_string(), format!("connection not found: {id}"));
    }
}
