//! Opaque connection identifier.
//!
//! [`ConnectionId`] is a newtype around a random [`uuid::Uuid`] (v4). Ids are
//! never reused while the process runs, so an id that outlives its
//! connection can only miss in the registry, never alias another session.

use std::fmt;

/// Identifier assigned to a connection when it is admitted.
///
/// Stable for the lifetime of the connection and used as the key of
/// [`super::ConnectionRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Creates a new random `ConnectionId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
