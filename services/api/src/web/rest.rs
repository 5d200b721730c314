//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::adapters::whatsapp;
use crate::web::state::AppState;
use academy_core::{ConversationEngine, LeadProfile, Message, RemainingTime, Sender};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_chat_handler,
        get_chat_handler,
        submit_message_handler,
        handoff_handler,
        get_countdown_handler,
        reset_countdown_handler,
    ),
    components(
        schemas(
            ChatResponse,
            MessageDto,
            SenderDto,
            LeadProfileDto,
            SubmitMessageRequest,
            HandoffResponse,
            CountdownResponse,
        )
    ),
    tags(
        (name = "Academy Lead Capture API", description = "Chat lead capture and the exam banner countdown.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SenderDto {
    Visitor,
    Engine,
}

/// One transcript entry as sent to the browser.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct MessageDto {
    pub id: u64,
    pub sender: SenderDto,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_replies: Option<Vec<String>>,
    pub offer_external_handoff: bool,
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            sender: match message.sender {
                Sender::Visitor => SenderDto::Visitor,
                Sender::Engine => SenderDto::Engine,
            },
            text: message.text.clone(),
            timestamp: message.timestamp,
            quick_replies: message.quick_replies.clone(),
            offer_external_handoff: message.offer_external_handoff,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct LeadProfileDto {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub interested_course: String,
    pub current_class: String,
    pub weak_subjects: Vec<String>,
    pub strong_subjects: Vec<String>,
    pub target_exam_year: String,
}

impl From<&LeadProfile> for LeadProfileDto {
    fn from(profile: &LeadProfile) -> Self {
        Self {
            name: profile.name.clone(),
            phone: profile.phone.clone(),
            email: profile.email.clone(),
            interested_course: profile.interested_course.clone(),
            current_class: profile.current_class.clone(),
            weak_subjects: profile.weak_subjects.clone(),
            strong_subjects: profile.strong_subjects.clone(),
            target_exam_year: profile.target_exam_year.clone(),
        }
    }
}

/// The full state of a chat session.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ChatResponse {
    pub session_id: Uuid,
    /// 0-based step index; absent once the interview is complete.
    pub current_step: Option<usize>,
    pub step: String,
    pub complete: bool,
    pub messages: Vec<MessageDto>,
    pub profile: LeadProfileDto,
}

impl ChatResponse {
    fn new(session_id: Uuid, engine: &ConversationEngine) -> Self {
        let state = engine.state();
        Self {
            session_id,
            current_step: state.current_step.index(),
            step: state.current_step.label().to_string(),
            complete: engine.is_complete(),
            messages: state.messages.iter().map(MessageDto::from).collect(),
            profile: LeadProfileDto::from(engine.profile()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SubmitMessageRequest {
    pub text: String,
}

/// The lead summary and the link that opens it in WhatsApp.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HandoffResponse {
    pub text: String,
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CountdownResponse {
    pub namespace: String,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub total_seconds: u64,
    pub cycle_seconds: u64,
}

impl CountdownResponse {
    fn new(namespace: &str, cycle_ms: u64, remaining: RemainingTime) -> Self {
        Self {
            namespace: namespace.to_string(),
            hours: remaining.hours,
            minutes: remaining.minutes,
            seconds: remaining.seconds,
            total_seconds: remaining.total_seconds,
            cycle_seconds: cycle_ms / 1000,
        }
    }
}

fn chat_not_found(session_id: Uuid) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        format!("Chat session {} not found", session_id),
    )
}

//=========================================================================================
// Chat Handlers
//=========================================================================================

/// Start a new chat. The response already contains the greeting.
#[utoipa::path(
    post,
    path = "/chat",
    responses(
        (status = 201, description = "Chat created", body = ChatResponse)
    )
)]
pub async fn create_chat_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let (session_id, session) = app_state.chats.create().await;
    info!("Created chat session {}", session_id);
    let engine = session.engine.lock().await;
    (
        StatusCode::CREATED,
        Json(ChatResponse::new(session_id, &engine)),
    )
}

/// Fetch a chat's transcript and the lead data collected so far.
#[utoipa::path(
    get,
    path = "/chat/{session_id}",
    responses(
        (status = 200, description = "Current chat state", body = ChatResponse),
        (status = 404, description = "Unknown chat session")
    ),
    params(
        ("session_id" = Uuid, Path, description = "The chat session id.")
    )
)]
pub async fn get_chat_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let session = app_state
        .chats
        .get(session_id)
        .await
        .ok_or_else(|| chat_not_found(session_id))?;
    let engine = session.engine.lock().await;
    Ok(Json(ChatResponse::new(session_id, &engine)))
}

/// Submit the visitor's answer for the current step.
///
/// Blank answers and answers after the interview has finished leave the chat unchanged.
#[utoipa::path(
    post,
    path = "/chat/{session_id}/messages",
    request_body = SubmitMessageRequest,
    responses(
        (status = 200, description = "Chat state after the answer", body = ChatResponse),
        (status = 404, description = "Unknown chat session")
    ),
    params(
        ("session_id" = Uuid, Path, description = "The chat session id.")
    )
)]
pub async fn submit_message_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<SubmitMessageRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let session = app_state
        .chats
        .get(session_id)
        .await
        .ok_or_else(|| chat_not_found(session_id))?;

    let mut engine = session.engine.lock().await;
    let was_complete = engine.is_complete();
    engine.submit_visitor_input(&payload.text);
    if !was_complete && engine.is_complete() {
        info!("Chat session {} completed the interview", session_id);
    }
    Ok(Json(ChatResponse::new(session_id, &engine)))
}

/// Build the WhatsApp handoff for a chat. Available at any point of the interview.
#[utoipa::path(
    get,
    path = "/chat/{session_id}/handoff",
    responses(
        (status = 200, description = "Handoff text and WhatsApp link", body = HandoffResponse),
        (status = 404, description = "Unknown chat session")
    ),
    params(
        ("session_id" = Uuid, Path, description = "The chat session id.")
    )
)]
pub async fn handoff_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<HandoffResponse>, (StatusCode, String)> {
    let session = app_state
        .chats
        .get(session_id)
        .await
        .ok_or_else(|| chat_not_found(session_id))?;

    let text = session.engine.lock().await.build_external_handoff_message();
    let url = whatsapp::send_url(&app_state.config.whatsapp_number, &text);
    Ok(Json(HandoffResponse { text, url }))
}

//=========================================================================================
// Countdown Handlers
//=========================================================================================

/// Time left in the exam banner's current cycle.
#[utoipa::path(
    get,
    path = "/countdown",
    responses(
        (status = 200, description = "Remaining time", body = CountdownResponse),
        (status = 500, description = "Countdown misconfigured")
    )
)]
pub async fn get_countdown_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<CountdownResponse>, (StatusCode, String)> {
    let (countdown, remaining) = app_state.banner_countdown().await.map_err(|e| {
        error!("Failed to initialize countdown: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Countdown is not available".to_string(),
        )
    })?;
    Ok(Json(CountdownResponse::new(
        countdown.namespace(),
        countdown.cycle_duration_ms(),
        remaining,
    )))
}

/// Start a new banner cycle now.
#[utoipa::path(
    post,
    path = "/countdown/reset",
    responses(
        (status = 200, description = "Remaining time of the new cycle", body = CountdownResponse),
        (status = 500, description = "Countdown misconfigured")
    )
)]
pub async fn reset_countdown_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<CountdownResponse>, (StatusCode, String)> {
    let (mut countdown, _) = app_state.banner_countdown().await.map_err(|e| {
        error!("Failed to initialize countdown: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Countdown is not available".to_string(),
        )
    })?;
    let remaining = countdown.reset().await;
    info!("Countdown {} reset through the API", countdown.namespace());
    Ok(Json(CountdownResponse::new(
        countdown.namespace(),
        countdown.cycle_duration_ms(),
        remaining,
    )))
}
