//! Axum WebSocket upgrade handlers.

use axum::extract::Request;
use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use super::connection::run_connection;
use crate::app_state::AppState;

/// `GET /ws` — Upgrade HTTP connection to WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    upgrade(ws, &state)
}

/// `GET /` — Upgrade to WebSocket when requested, otherwise serve the
/// index page.
pub async fn root_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<AppState>,
    request: Request,
) -> Response {
    match ws {
        Ok(ws) => upgrade(ws, &state),
        Err(_) => match ServeFile::new(state.index_file.as_path())
            .oneshot(request)
            .await
        {
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        },
    }
}

fn upgrade(ws: WebSocketUpgrade, state: &AppState) -> Response {
    let dispatcher = std::sync::Arc::clone(&state.dispatcher);
    ws.on_upgrade(move |socket| run_connection(socket, dispatcher))
}
