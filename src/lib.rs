//! # chat-relay
//!
//! Real-time broadcast relay for a single chat room.
//!
//! Clients connect over WebSocket, optionally set a display name, and
//! exchange chat messages and typing notices with everyone else who is
//! connected. Nothing is persisted; delivery is best effort.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket, HTTP)
//!     │
//!     ├── Upgrade handlers + session loop (ws/)
//!     ├── Health + static assets (api/)
//!     │
//!     ├── Dispatcher (service/)
//!     │
//!     └── ConnectionRegistry (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;
