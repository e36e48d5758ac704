//! Per-connection session loop.
//!
//! Bridges one WebSocket to the dispatcher: admits the connection, forwards
//! inbound frames, drains the connection's outbound channel into the socket,
//! and reports closure exactly once.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use crate::domain::ChannelHandle;
use crate::service::Dispatcher;

/// How long the writer may keep flushing after the session ends.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs a single WebSocket connection until either side goes away.
///
/// - A writer task forwards queued frames from the connection's channel.
/// - The read loop hands text frames (and UTF-8 binary frames) to the
///   dispatcher.
/// - A close frame, a read error, end of stream or a failed write ends the
///   session and evicts the connection.
pub async fn run_connection(socket: WebSocket, dispatcher: Arc<Dispatcher>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (channel, mut outbound_rx) = ChannelHandle::pair();

    let id = dispatcher.accept(channel).await;
    tracing::info!(%id, "client connected");

    let mut writer = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if ws_tx.send(Message::text(frame.to_string())).await.is_err() {
                break;
            }
        }
        if let Err(err) = ws_tx.close().await {
            tracing::debug!(%id, error = %err, "ws close failed");
        }
    });
    let mut writer_done = false;

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        dispatcher.handle_frame(id, text.as_str()).await;
                    }
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => dispatcher.handle_frame(id, text).await,
                        Err(err) => tracing::warn!(%id, error = %err, "dropping non-UTF-8 binary frame"),
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(%id, error = %err, "ws read failed");
                        break;
                    }
                    _ => {}
                }
            }
            _ = &mut writer => {
                writer_done = true;
                tracing::debug!(%id, "ws write side closed");
                break;
            }
        }
    }

    // Eviction drops the channel handle, letting the writer flush and close.
    dispatcher.on_closed(id).await;
    if !writer_done && tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer).await.is_err() {
        tracing::debug!(%id, "ws writer did not finish, aborting");
        writer.abort();
    }
    tracing::info!(%id, "client disconnected");
}
