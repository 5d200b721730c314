//! Drives the REST routes through the router with an in-memory anchor store.

use academy_api_lib::config::Config;
use academy_api_lib::web::rest::{ChatResponse, CountdownResponse, HandoffResponse, SenderDto};
use academy_api_lib::web::{api_router, AppState};
use academy_core::{AnchorStore, ManualClock, MemoryAnchorStore};
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::ServiceExt;
use tracing::Level;
use uuid::Uuid;

const START_MS: i64 = 1_700_000_000_000;
const CYCLE_MS: u64 = 12 * 3_600_000;

fn test_app() -> (Router, Arc<MemoryAnchorStore>, Arc<ManualClock>) {
    let config = Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: None,
        log_level: Level::INFO,
        cors_origin: "http://localhost:3000".to_string(),
        whatsapp_number: "919999999999".to_string(),
        countdown_namespace: "examBannerResetTime".to_string(),
        countdown_cycle_ms: CYCLE_MS,
    };
    let store = Arc::new(MemoryAnchorStore::new());
    let clock = Arc::new(ManualClock::new(START_MS));
    let state = AppState::new(Arc::new(config), store.clone(), clock.clone());
    (api_router(Arc::new(state)), store, clock)
}

async fn call<T: DeserializeOwned>(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, Option<T>) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).ok())
}

#[tokio::test]
async fn chat_runs_from_greeting_to_handoff() {
    let (app, _, _) = test_app();

    let (status, created) = call::<ChatResponse>(&app, Method::POST, "/chat", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let created = created.unwrap();
    assert_eq!(created.current_step, Some(0));
    assert_eq!(created.messages.len(), 1);

    let uri = format!("/chat/{}/messages", created.session_id);
    let answers = [
        "Asha", "9999999999", "asha@x.com", "JEE", "11", "Mathematics", "Biology", "2027",
    ];
    let mut last = None;
    for answer in answers {
        let (status, chat) = call::<ChatResponse>(
            &app,
            Method::POST,
            &uri,
            Some(serde_json::json!({ "text": answer })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        last = chat;
    }

    let chat = last.unwrap();
    assert!(chat.complete);
    assert_eq!(chat.current_step, None);
    assert_eq!(chat.step, "complete");
    assert_eq!(chat.profile.weak_subjects, vec!["Mathematics".to_string()]);
    let offer = chat.messages.last().unwrap();
    assert_eq!(offer.sender, SenderDto::Engine);
    assert!(offer.offer_external_handoff);

    let (status, handoff) = call::<HandoffResponse>(
        &app,
        Method::GET,
        &format!("/chat/{}/handoff", created.session_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let handoff = handoff.unwrap();
    assert!(handoff.text.contains("• Interested Course: JEE"));
    assert!(handoff
        .url
        .starts_with("https://api.whatsapp.com/send?phone=919999999999&text="));
}

#[tokio::test]
async fn blank_submission_leaves_chat_unchanged() {
    let (app, _, _) = test_app();
    let (_, created) = call::<ChatResponse>(&app, Method::POST, "/chat", None).await;
    let created = created.unwrap();

    let (status, chat) = call::<ChatResponse>(
        &app,
        Method::POST,
        &format!("/chat/{}/messages", created.session_id),
        Some(serde_json::json!({ "text": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let chat = chat.unwrap();
    assert_eq!(chat.messages.len(), 1);
    assert_eq!(chat.current_step, Some(0));
}

#[tokio::test]
async fn unknown_chat_is_not_found() {
    let (app, _, _) = test_app();
    let (status, _) = call::<ChatResponse>(
        &app,
        Method::GET,
        &format!("/chat/{}", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn countdown_persists_between_requests_and_resets() {
    let (app, store, clock) = test_app();

    let (status, first) = call::<CountdownResponse>(&app, Method::GET, "/countdown", None).await;
    assert_eq!(status, StatusCode::OK);
    let first = first.unwrap();
    assert_eq!(first.total_seconds, CYCLE_MS / 1000);
    assert_eq!(first.cycle_seconds, CYCLE_MS / 1000);

    clock.advance(3 * 3_600_000);
    let (_, later) = call::<CountdownResponse>(&app, Method::GET, "/countdown", None).await;
    assert_eq!(later.unwrap().hours, 9);

    let (status, reset) =
        call::<CountdownResponse>(&app, Method::POST, "/countdown/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reset.unwrap().total_seconds, CYCLE_MS / 1000);
    assert_eq!(
        store.load_anchor("examBannerResetTime").await.unwrap(),
        Some((START_MS + 3 * 3_600_000).to_string())
    );
}
