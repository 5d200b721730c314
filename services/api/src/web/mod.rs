pub mod countdown_task;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use rest::{
    create_chat_handler, get_chat_handler, get_countdown_handler, handoff_handler,
    reset_countdown_handler, submit_message_handler,
};
pub use state::AppState;
pub use ws_handler::ws_handler;

/// Builds the API routes. CORS and the Swagger UI are layered on by the binary.
pub fn api_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat", post(create_chat_handler))
        .route("/chat/{session_id}", get(get_chat_handler))
        .route("/chat/{session_id}/messages", post(submit_message_handler))
        .route("/chat/{session_id}/handoff", get(handoff_handler))
        .route("/countdown", get(get_countdown_handler))
        .route("/countdown/reset", post(reset_countdown_handler))
        .route("/countdown/ws", get(ws_handler))
        .with_state(app_state)
}
