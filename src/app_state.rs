//! Shared application state injected into all Axum handlers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::RelayConfig;
use crate::domain::ConnectionRegistry;
use crate::service::Dispatcher;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Dispatcher owning the connection registry.
    pub dispatcher: Arc<Dispatcher>,
    /// Page served for a plain `GET /`.
    pub index_file: Arc<PathBuf>,
}

impl AppState {
    /// Builds the registry, dispatcher and state described by `config`.
    #[must_use]
    pub fn from_config(config: &RelayConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new(
            config.default_display_name.clone(),
        ));
        let dispatcher = Arc::new(Dispatcher::new(registry, config.welcome_message.clone()));
        Self {
            dispatcher,
            index_file: Arc::new(config.index_file.clone()),
        }
    }
}
