//! Outbound channel owned by a single connection.
//!
//! A [`ChannelHandle`] is the sending half of an unbounded
//! [`tokio::sync::mpsc`] channel. The transport layer keeps the receiving
//! half and drains it into the socket; the registry keeps the handle inside
//! the connection's entry and nothing else writes to it.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::RelayError;

/// A serialized outbound frame. Shared between recipients of a broadcast so
/// the event is encoded once.
pub type Frame = Arc<str>;

/// Send capability for one connection.
#[derive(Debug)]
pub struct ChannelHandle {
    sender: mpsc::UnboundedSender<Frame>,
}

impl ChannelHandle {
    /// Wraps an existing sender.
    #[must_use]
    pub const fn new(sender: mpsc::UnboundedSender<Frame>) -> Self {
        Self { sender }
    }

    /// Creates a handle together with the receiver the transport drains.
    #[must_use]
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<Frame>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }

    /// Returns `true` while the receiving side is still alive.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Queues a frame for delivery. Never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ChannelClosed`] if the receiving side has been
    /// dropped.
    pub fn send(&self, frame: Frame) -> Result<(), RelayError> {
        self.sender
            .send(frame)
            .map_err(|_| RelayError::ChannelClosed)
    }
}
