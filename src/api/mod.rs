//! HTTP layer: router composition for the relay.
//!
//! `/` and `/ws` accept WebSocket upgrades, `/health` reports status, and
//! every other path is served from the static asset directory.

pub mod handlers;

use axum::Router;
use axum::routing::get;
use tower_http::services::ServeDir;

use crate::app_state::AppState;
use crate::config::RelayConfig;
use crate::ws::handler::{root_handler, ws_handler};

/// Builds the complete router. Layers and state are added by the caller.
pub fn build_router(config: &RelayConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(root_handler))
        .route("/ws", get(ws_handler))
        .merge(handlers::system::routes())
        .fallback_service(ServeDir::new(&config.static_dir))
}
