//! Broadcast dispatcher: turns inbound events into deliveries.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    ChannelHandle, ConnectionId, ConnectionRegistry, InboundEvent, OutboundEvent, ParsedFrame,
    RegistrySnapshot,
};

/// Welcome text sent to every new connection unless configured otherwise.
pub const DEFAULT_WELCOME_MESSAGE: &str = "欢迎来到聊天室！";

/// Fan-out coordinator over a shared [`ConnectionRegistry`].
///
/// Stateless apart from the registry and the welcome text. Every handler
/// follows the same pattern: update the registry if needed, build one
/// [`OutboundEvent`], encode it once and hand the frame to each recipient.
/// A failed delivery only affects its own recipient.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ConnectionRegistry>,
    welcome_message: String,
}

impl Dispatcher {
    /// Creates a new `Dispatcher`.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>, welcome_message: impl Into<String>) -> Self {
        Self {
            registry,
            welcome_message: welcome_message.into(),
        }
    }

    /// Returns a reference to the inner [`ConnectionRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Admits a new connection and announces it.
    ///
    /// The welcome is queued on `channel` before the connection becomes
    /// visible to other broadcasts, so it is always the first frame.
    pub async fn accept(&self, channel: ChannelHandle) -> ConnectionId {
        match self.welcome().encode() {
            Ok(frame) => {
                if let Err(err) = channel.send(frame) {
                    tracing::warn!(error = %err, event = "system", "delivery failed");
                }
            }
            Err(err) => tracing::error!(kind = err.kind(), error = %err, "failed to encode event"),
        }
        let id = self.registry.admit(channel).await;
        self.broadcast_user_count().await;
        id
    }

    /// Greets `id` and broadcasts the new connection count to everyone.
    ///
    /// For connections admitted directly through the registry; [`accept`]
    /// already does both.
    ///
    /// [`accept`]: Self::accept
    pub async fn on_admitted(&self, id: ConnectionId) {
        self.send_to(id, &self.welcome()).await;
        self.broadcast_user_count().await;
    }

    fn welcome(&self) -> OutboundEvent {
        OutboundEvent::Welcome {
            message: self.welcome_message.clone(),
        }
    }

    /// Parses a raw frame from `id` and dispatches it.
    ///
    /// Malformed frames and unknown discriminators are logged and dropped;
    /// nothing is sent back to the client.
    pub async fn handle_frame(&self, id: ConnectionId, text: &str) {
        match InboundEvent::parse(text) {
            Ok(ParsedFrame::Event(event)) => self.on_inbound(id, event).await,
            Ok(ParsedFrame::Unrecognized(kind)) => {
                tracing::debug!(%id, kind = kind.as_deref().unwrap_or(""), "ignoring unrecognized frame");
            }
            Err(err) => {
                tracing::warn!(%id, kind = err.kind(), error = %err, "dropping inbound frame");
            }
        }
    }

    /// Applies one inbound event from `id`.
    pub async fn on_inbound(&self, id: ConnectionId, event: InboundEvent) {
        tracing::trace!(%id, event = event.type_str(), "inbound event");
        match event {
            InboundEvent::SetName { username } => {
                if !self.registry.set_name(id, username).await {
                    tracing::debug!(%id, "rename for evicted connection ignored");
                }
                // Count is unchanged; clients use the rebroadcast as a refresh.
                self.broadcast_user_count().await;
            }
            InboundEvent::ChatMessage { message } => {
                let Ok(sender) = self.registry.lookup(id).await else {
                    tracing::debug!(%id, "message from evicted connection dropped");
                    return;
                };
                let event = OutboundEvent::Message {
                    username: sender.display_name,
                    message,
                    timestamp: Utc::now().timestamp_millis(),
                };
                self.broadcast(&event, None).await;
            }
            InboundEvent::TypingStatus { is_typing } => {
                let Ok(sender) = self.registry.lookup(id).await else {
                    tracing::debug!(%id, "typing status from evicted connection dropped");
                    return;
                };
                let event = OutboundEvent::Typing {
                    username: sender.display_name,
                    is_typing,
                };
                self.broadcast(&event, Some(id)).await;
            }
        }
    }

    /// Evicts `id` and broadcasts the remaining connection count.
    pub async fn on_closed(&self, id: ConnectionId) {
        if self.registry.evict(id).await {
            tracing::debug!(%id, "connection evicted");
        }
        self.broadcast_user_count().await;
    }

    /// Delivers `event` to every live connection except `exclude`.
    ///
    /// Returns the number of recipients the frame was queued for.
    pub async fn broadcast(&self, event: &OutboundEvent, exclude: Option<ConnectionId>) -> usize {
        let snapshot = self.registry.snapshot().await;
        deliver(&snapshot, event, exclude)
    }

    /// Delivers `event` to `id` only. Returns `false` if it could not be
    /// queued.
    pub async fn send_to(&self, id: ConnectionId, event: &OutboundEvent) -> bool {
        let frame = match event.encode() {
            Ok(frame) => frame,
            Err(err) => {
                tracing::error!(kind = err.kind(), error = %err, "failed to encode event");
                return false;
            }
        };
        let snapshot = self.registry.snapshot().await;
        let Some(entry) = snapshot.get(id) else {
            return false;
        };
        match entry.channel().send(frame) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%id, error = %err, event = event.type_str(), "delivery failed");
                false
            }
        }
    }

    /// Broadcasts the registry size, read from the same view the frame is
    /// delivered through.
    async fn broadcast_user_count(&self) -> usize {
        let snapshot = self.registry.snapshot().await;
        let event = OutboundEvent::UserCount {
            count: snapshot.len(),
        };
        deliver(&snapshot, &event, None)
    }
}

/// Encodes `event` once and queues it on every open channel in `snapshot`
/// except `exclude`.
fn deliver(
    snapshot: &RegistrySnapshot<'_>,
    event: &OutboundEvent,
    exclude: Option<ConnectionId>,
) -> usize {
    let frame = match event.encode() {
        Ok(frame) => frame,
        Err(err) => {
            tracing::error!(kind = err.kind(), error = %err, "failed to encode event");
            return 0;
        }
    };

    let mut delivered = 0usize;
    let mut skipped = 0usize;
    for entry in snapshot.iter() {
        if Some(entry.id) == exclude {
            continue;
        }
        let channel = entry.channel();
        if !channel.is_open() {
            skipped = skipped.saturating_add(1);
            tracing::warn!(id = %entry.id, event = event.type_str(), "recipient channel closed, skipping");
            continue;
        }
        match channel.send(Arc::clone(&frame)) {
            Ok(()) => delivered = delivered.saturating_add(1),
            Err(err) => {
                skipped = skipped.saturating_add(1);
                tracing::warn!(id = %entry.id, error = %err, event = event.type_str(), "delivery failed");
            }
        }
    }

    tracing::debug!(event = event.type_str(), delivered, skipped, "broadcast");
    delivered
}
