//! Wire events exchanged with chat clients.
//!
//! Every frame is a single JSON object tagged by a `type` field. Inbound
//! frames are parsed into the closed [`InboundEvent`] set; anything carrying
//! another discriminator becomes [`ParsedFrame::Unrecognized`]. Outbound
//! frames are built from [`OutboundEvent`] and encoded once per broadcast.

use serde::{Deserialize, Serialize};

use super::channel::Frame;
use crate::error::RelayError;

/// Discriminator values accepted from clients.
const INBOUND_TYPES: [&str; 3] = ["setUsername", "message", "typing"];

/// Event sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum InboundEvent {
    /// `{"type":"setUsername","username":...}`
    #[serde(rename = "setUsername")]
    SetName {
        /// New display name. Opaque text, empty allowed.
        username: String,
    },

    /// `{"type":"message","message":...}`
    #[serde(rename = "message")]
    ChatMessage {
        /// Message body.
        message: String,
    },

    /// `{"type":"typing","isTyping":...}`
    #[serde(rename = "typing")]
    TypingStatus {
        /// Whether the sender is currently typing.
        #[serde(rename = "isTyping")]
        is_typing: bool,
    },
}

/// Result of parsing one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedFrame {
    /// A recognized, fully populated event.
    Event(InboundEvent),
    /// Valid JSON whose `type` is missing or not one we handle.
    Unrecognized(Option<String>),
}

impl InboundEvent {
    /// Parses a raw text frame.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MalformedFrame`] if the text is not JSON, or if
    /// it names a known `type` but its fields do not match that shape.
    pub fn parse(text: &str) -> Result<ParsedFrame, RelayError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(RelayError::MalformedFrame)?;

        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned);

        match kind {
            Some(kind) if INBOUND_TYPES.contains(&kind.as_str()) => serde_json::from_value(value)
                .map(ParsedFrame::Event)
                .map_err(RelayError::MalformedFrame),
            other => Ok(ParsedFrame::Unrecognized(other)),
        }
    }

    /// Returns the wire discriminator of this event.
    #[must_use]
    pub const fn type_str(&self) -> &'static str {
        match self {
            Self::SetName { .. } => "setUsername",
            Self::ChatMessage { .. } => "message",
            Self::TypingStatus { .. } => "typing",
        }
    }
}

/// Event sent by the relay.
///
/// Field order matches the frames existing clients expect: `type` first,
/// then the payload fields as declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum OutboundEvent {
    /// Greeting sent only to a newly admitted connection.
    #[serde(rename = "system")]
    Welcome {
        /// Greeting text.
        message: String,
    },

    /// Number of live connections, sent to everyone.
    #[serde(rename = "userCount")]
    UserCount {
        /// Registry size at broadcast time.
        count: usize,
    },

    /// Chat message, sent to everyone including its author.
    #[serde(rename = "message")]
    Message {
        /// Author's display name.
        username: String,
        /// Message body.
        message: String,
        /// Receipt time in milliseconds since the Unix epoch.
        timestamp: i64,
    },

    /// Typing notice, sent to everyone except its author.
    #[serde(rename = "typing")]
    Typing {
        /// Author's display name.
        username: String,
        /// Whether the author is typing.
        #[serde(rename = "isTyping")]
        is_typing: bool,
    },
}

impl OutboundEvent {
    /// Serializes the event into a shareable frame.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Serialization`] if JSON encoding fails.
    pub fn encode(&self) -> Result<Frame, RelayError> {
        Ok(Frame::from(serde_json::to_string(self)?))
    }

    /// Returns the wire discriminator of this event.
    #[must_use]
    pub const fn type_str(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "system",
            Self::UserCount { .. } => "userCount",
            Self::Message { .. } => "message",
            Self::Typing { .. } => "typing",
        }
    }
}
