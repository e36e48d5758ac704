//! Authoritative set of live connections.
//!
//! [`ConnectionRegistry`] keeps every admitted connection in a `HashMap`
//! behind a single [`tokio::sync::RwLock`]. Admission, renaming and eviction
//! take the write lock; lookups and fan-out take the read lock, so a
//! traversal never observes a half-inserted or already-removed entry.

use std::collections::HashMap;
use std::collections::hash_map::Values;

use tokio::sync::{RwLock, RwLockReadGuard};

use super::ConnectionId;
use super::channel::ChannelHandle;
use super::connection_entry::{ConnectionEntry, ConnectionInfo};
use crate::error::RelayError;

/// Display name given to connections that never sent `setUsername`.
pub const DEFAULT_DISPLAY_NAME: &str = "匿名用户";

/// Registry of live connections keyed by [`ConnectionId`].
///
/// # Concurrency
///
/// - Any number of readers may traverse the registry at once.
/// - `admit`, `set_name` and `evict` are serialized with each other and
///   with readers.
#[derive(Debug)]
pub struct ConnectionRegistry {
    entries: RwLock<HashMap<ConnectionId, ConnectionEntry>>,
    default_display_name: String,
}

impl ConnectionRegistry {
    /// Creates an empty registry whose new entries start with
    /// `default_display_name`.
    #[must_use]
    pub fn new(default_display_name: impl Into<String>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_display_name: default_display_name.into(),
        }
    }

    /// Admits a connection and returns its freshly generated id.
    pub async fn admit(&self, channel: ChannelHandle) -> ConnectionId {
        let mut map = self.entries.write().await;
        let mut id = ConnectionId::new();
        while map.contains_key(&id) {
            id = ConnectionId::new();
        }
        map.insert(
            id,
            ConnectionEntry::new(id, self.default_display_name.clone(), channel),
        );
        id
    }

    /// Overwrites the display name of `id`.
    ///
    /// Returns `false` without error if the connection is already gone.
    pub async fn set_name(&self, id: ConnectionId, name: String) -> bool {
        let mut map = self.entries.write().await;
        match map.get_mut(&id) {
            Some(entry) => {
                entry.display_name = name;
                true
            }
            None => false,
        }
    }

    /// Returns a copy of the entry for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ConnectionNotFound`] if `id` is not live.
    pub async fn lookup(&self, id: ConnectionId) -> Result<ConnectionInfo, RelayError> {
        let map = self.entries.read().await;
        map.get(&id)
            .map(ConnectionInfo::from)
            .ok_or(RelayError::ConnectionNotFound(id))
    }

    /// Removes `id` from the registry. Idempotent.
    ///
    /// Returns `true` if an entry was actually removed. Dropping the entry
    /// drops its channel handle, which ends the transport's writer.
    pub async fn evict(&self, id: ConnectionId) -> bool {
        self.entries.write().await.remove(&id).is_some()
    }

    /// Returns the number of live connections.
    pub async fn size(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if no connection is live.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Applies `f` to every live entry under one read lock.
    pub async fn for_each<F>(&self, f: F)
    where
        F: FnMut(&ConnectionEntry),
    {
        self.snapshot().await.iter().for_each(f);
    }

    /// Returns a read view of the registry.
    ///
    /// The size and the entries seen through one view are consistent with
    /// each other. Writers wait until the view is dropped, so keep it short.
    pub async fn snapshot(&self) -> RegistrySnapshot<'_> {
        RegistrySnapshot {
            guard: self.entries.read().await,
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY_NAME)
    }
}

/// Point-in-time read view returned by [`ConnectionRegistry::snapshot`].
#[derive(Debug)]
pub struct RegistrySnapshot<'a> {
    guard: RwLockReadGuard<'a, HashMap<ConnectionId, ConnectionEntry>>,
}

impl RegistrySnapshot<'_> {
    /// Number of entries in this view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guard.len()
    }

    /// Returns `true` if the view has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guard.is_empty()
    }

    /// Returns the entry for `id`, if it is live in this view.
    #[must_use]
    pub fn get(&self, id: ConnectionId) -> Option<&ConnectionEntry> {
        self.guard.get(&id)
    }

    /// Iterates over the entries in this view, in no particular order.
    pub fn iter(&self) -> Values<'_, ConnectionId, ConnectionEntry> {
        self.guard.values()
    }
}
