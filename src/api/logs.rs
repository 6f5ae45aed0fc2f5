/// WebSocket log streaming endpoint
///
/// Subscribers connect to /ws/logs and receive every step notification as a
/// JSON text frame {node, state}. Each connection owns an independent
/// broadcast receiver: a slow or disconnected client lags or drops on its
/// own receiver and can never block a run or another subscriber. Entries
/// from concurrent runs may interleave; per-run ordering is preserved.

use crate::api::graphs::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State as AxumState,
    },
    response::IntoResponse,
    routing::{get, Router},
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

/// Create the log streaming route
pub fn create_log_routes() -> Router<AppState> {
    Router::new().route("/ws/logs", get(ws_logs))
}

/// GET /ws/logs — WebSocket upgrade
async fn ws_logs(
    ws: WebSocketUpgrade,
    AxumState(state): AxumState<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| stream_logs(socket, state))
}

/// Forward step notifications to one connected subscriber
async fn stream_logs(socket: WebSocket, state: AppState) {
    tracing::info!("Log subscriber connected");

    let (mut outbound, mut inbound) = socket.split();
    let mut entries = state.broadcaster.subscribe();

    loop {
        tokio::select! {
            entry = entries.recv() => match entry {
                Ok(entry) => {
                    let payload = match serde_json::to_string(&entry) {
                        Ok(payload) => payload,
                        Err(e) => {
                            tracing::error!("Failed to serialize log entry: {}", e);
                            continue;
                        }
                    };
                    if outbound.send(Message::Text(payload.into())).await.is_err() {
                        break; // client gone
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // This subscriber fell behind; runs are unaffected
                    tracing::warn!("Log subscriber lagged, skipped {} entries", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            frame = inbound.next() => match frame {
                // Inbound frames are ignored; the stream is one-way
                Some(Ok(_)) => {}
                Some(Err(_)) | None => break,
            },
        }
    }

    tracing::info!("Log subscriber disconnected");
}
