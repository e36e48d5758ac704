//! Per-connection session state held by the registry.

use chrono::{DateTime, Utc};

use super::ConnectionId;
use super::channel::ChannelHandle;

/// One live connection: identity, display name and its outbound channel.
///
/// The entry is the sole owner of the connection's [`ChannelHandle`].
#[derive(Debug)]
pub struct ConnectionEntry {
    /// Identifier assigned at admission (immutable).
    pub id: ConnectionId,

    /// Name shown on this connection's messages and typing notices.
    pub display_name: String,

    /// Admission timestamp (immutable).
    pub connected_at: DateTime<Utc>,

    channel: ChannelHandle,
}

impl ConnectionEntry {
    /// Creates an entry for a freshly admitted connection.
    #[must_use]
    pub fn new(id: ConnectionId, display_name: String, channel: ChannelHandle) -> Self {
        Self {
            id,
            display_name,
            connected_at: Utc::now(),
            channel,
        }
    }

    /// Returns the connection's outbound channel.
    #[must_use]
    pub const fn channel(&self) -> &ChannelHandle {
        &self.channel
    }
}

/// Read-only copy of an entry, returned by registry lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Connection identifier.
    pub id: ConnectionId,
    /// Display name at the time of the lookup.
    pub display_name: String,
    /// Admission timestamp.
    pub connected_at: DateTime<Utc>,
}

impl From<&ConnectionEntry> for ConnectionInfo {
    fn from(entry: &ConnectionEntry) -> Self {
        Self {
            id: entry.id,
            display_name: entry.display_name.clone(),
            connected_at: entry.connected_at,
        }
    }
}
