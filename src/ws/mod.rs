//! WebSocket layer: upgrade handlers and the per-connection session loop.
//!
//! This is the transport side of the relay. It owns the sockets and talks
//! to the [`crate::service::Dispatcher`] only through connection ids and
//! [`crate::domain::ChannelHandle`]s.

pub mod connection;
pub mod handler;
