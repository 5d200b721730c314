//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a countdown WebSocket
//! connection. It owns the connection's ticker task and handles client commands.

use crate::web::{
    countdown_task::{countdown_process, handle_client_text, send_message, WsSender},
    protocol::ServerMessage,
    state::AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New countdown WebSocket connection established.");

    let (sender, mut receiver) = socket.split();
    let ws_sender: WsSender = Arc::new(Mutex::new(sender));

    // --- 1. Initialization Phase ---
    let (mut countdown, remaining) = match app_state.banner_countdown().await {
        Ok(initialized) => initialized,
        Err(e) => {
            error!("Failed to initialize countdown: {}", e);
            let err_msg = ServerMessage::Error {
                message: "Countdown is not available.".to_string(),
            };
            let _ = send_message(&ws_sender, &err_msg).await;
            return;
        }
    };

    let (rollover_tx, rollover_rx) = mpsc::unbounded_channel();
    countdown.on_rollover(move |rollover| {
        // The receiver is gone once the ticker has stopped; nothing to notify then.
        let _ = rollover_tx.send(rollover.clone());
    });
    let countdown = Arc::new(Mutex::new(countdown));

    if send_message(&ws_sender, &ServerMessage::from(remaining)).await.is_err() {
        error!("Failed to send initial countdown.");
        return;
    }

    let cancellation_token = CancellationToken::new();
    let ticker = {
        let countdown = countdown.clone();
        let ws_sender = ws_sender.clone();
        let token = cancellation_token.clone();
        tokio::spawn(countdown_process(countdown, rollover_rx, ws_sender, token))
    };

    // --- 2. Main Message Loop ---
    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => {
                if let Err(e) = handle_client_text(text.as_str(), &countdown, &ws_sender).await {
                    error!("Failed to send countdown after reset: {}", e);
                    break;
                }
            }
            Message::Close(_) => {
                info!("Client sent close message.");
                break;
            }
            _ => {}
        }
    }

    // --- 3. Cleanup ---
    cancellation_token.cancel();
    if let Err(e) = ticker.await {
        error!("Countdown task ended abnormally: {:?}", e);
    }
    info!("Countdown WebSocket connection closed.");
}
