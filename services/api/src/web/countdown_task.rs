//! services/api/src/web/countdown_task.rs
//!
//! This module contains the asynchronous "worker" function that drives a
//! connection's countdown once a second, plus the handling of client commands.

use crate::web::protocol::{ClientMessage, ServerMessage};
use academy_core::{CycleCountdown, Rollover};
use axum::extract::ws::{Message, WebSocket};
use futures::{stream::SplitSink, Sink, SinkExt};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// The write half of a connection, shared by the ticker and the command loop.
pub type WsSender<S = SplitSink<WebSocket, Message>> = Arc<Mutex<S>>;

/// Serializes a `ServerMessage` and sends it as a text frame.
pub async fn send_message<S>(ws_sender: &WsSender<S>, msg: &ServerMessage) -> Result<(), String>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    ws_sender
        .lock()
        .await
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| e.to_string())
}

/// Applies one text frame from the client.
///
/// Malformed frames are logged and skipped. An error means the reply could not
/// be delivered and the connection should be closed.
pub async fn handle_client_text<S>(
    text: &str,
    countdown: &Mutex<CycleCountdown>,
    ws_sender: &WsSender<S>,
) -> Result<(), String>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Reset) => {
            info!("Reset message received.");
            let remaining = countdown.lock().await.reset().await;
            send_message(ws_sender, &ServerMessage::from(remaining)).await
        }
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            Ok(())
        }
    }
}

/// The main asynchronous task for the countdown banner.
///
/// Ticks the shared countdown every second and forwards rollover notifications.
/// Runs until the token is cancelled or the client goes away.
pub async fn countdown_process<S>(
    countdown: Arc<Mutex<CycleCountdown>>,
    mut rollovers: mpsc::UnboundedReceiver<Rollover>,
    ws_sender: WsSender<S>,
    cancellation_token: CancellationToken,
) where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    info!("Countdown process started.");

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // Remaining time is recomputed from the anchor, so missed ticks need no catch-up.
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let msg = tokio::select! {
            _ = cancellation_token.cancelled() => {
                info!("Countdown process cancelled.");
                return;
            }
            Some(rollover) = rollovers.recv() => ServerMessage::from(&rollover),
            _ = interval.tick() => {
                let remaining = countdown.lock().await.tick().await;
                ServerMessage::from(remaining)
            }
        };

        if let Err(e) = send_message(&ws_sender, &msg).await {
            error!("Failed to send countdown update to client: {}. Ending countdown task.", e);
            return;
        }
    }
}
