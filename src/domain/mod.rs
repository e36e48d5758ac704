//! Domain layer: connection identity, the connection registry and the wire
//! events exchanged with clients.

pub mod channel;
pub mod connection_entry;
pub mod connection_id;
pub mod connection_registry;
pub mod relay_event;

pub use channel::{ChannelHandle, Frame};
pub use connection_entry::{ConnectionEntry, ConnectionInfo};
pub use connection_id::ConnectionId;
pub use connection_registry::{ConnectionRegistry, RegistrySnapshot};
pub use relay_event::{InboundEvent, OutboundEvent, ParsedFrame};
