//! WebSocket connection lifecycle.
//!
//! One task per connection: attach, greet, then process inbound frames
//! strictly in arrival order. A writer task drains the channel's outbound
//! queue; when either side fails the connection is torn down and the
//! channel detached exactly once.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use chronicle_session::ChannelHandle;

use crate::game;
use crate::state::AppState;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    info!("New WebSocket connection request from user {}", user_id);
    ws.on_upgrade(move |socket| handle_socket(socket, user_id, state))
}

async fn handle_socket(socket: WebSocket, user_id: String, state: Arc<AppState>) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = ChannelHandle::new(tx);
    let channel_id = handle.id();

    // Attach before any message goes out so broadcasts triggered by other
    // windows of this user already include the new channel.
    state.registry.attach(&user_id, handle.clone());

    // Writer: drains queued frames onto the socket. A failed send means the
    // client is gone and the queue is dropped with the task.
    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let json = match serde_json::to_string(&frame) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize frame: {}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    if game::greet(&state, &user_id, &handle).await.is_ok() {
        // One in-flight message per channel: the next frame is not read
        // until this one is fully processed and broadcast.
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    debug!("Received message from user {}", user_id);
                    if game::handle_inbound(&state, &user_id, &text, &handle)
                        .await
                        .is_err()
                    {
                        // Send failure on this channel: treat it as gone.
                        break;
                    }
                }
                Ok(Message::Close(_)) => {
                    info!("Connection closed by user {}", user_id);
                    break;
                }
                Ok(_) => {} // ping/pong/binary: nothing to do
                Err(e) => {
                    debug!("WebSocket error for user {}: {}", user_id, e);
                    break;
                }
            }
        }
    }

    // Single cleanup point: every exit path above lands here, so detach
    // runs exactly once per channel.
    state.registry.detach(&user_id, channel_id);
    writer.abort();
    info!("Channel {} for user {} disconnected", channel_id, user_id);
}
