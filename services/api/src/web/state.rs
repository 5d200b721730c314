//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the registry of live chat sessions.

use crate::config::Config;
use academy_core::{
    AnchorStore, Clock, ConversationEngine, CountdownError, CycleCountdown, RemainingTime,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

/// Chats idle for longer than this are dropped when new ones are created.
const CHAT_IDLE_LIMIT_HOURS: i64 = 24;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub anchors: Arc<dyn AnchorStore>,
    pub clock: Arc<dyn Clock>,
    pub chats: Arc<ChatRegistry>,
}

impl AppState {
    pub fn new(config: Arc<Config>, anchors: Arc<dyn AnchorStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            anchors,
            clock,
            chats: Arc::new(ChatRegistry::default()),
        }
    }

    /// Opens a countdown on the configured banner namespace.
    pub async fn banner_countdown(
        &self,
    ) -> Result<(CycleCountdown, RemainingTime), CountdownError> {
        CycleCountdown::initialize(
            self.anchors.clone(),
            self.clock.clone(),
            self.config.countdown_namespace.clone(),
            self.config.countdown_cycle_ms,
        )
        .await
    }
}

//=========================================================================================
// ChatRegistry (One Engine per Visitor)
//=========================================================================================

/// A visitor's conversation. The mutex serialises submissions for that visitor.
pub struct ChatSession {
    pub engine: Mutex<ConversationEngine>,
    last_active: std::sync::Mutex<DateTime<Utc>>,
}

impl ChatSession {
    fn new() -> Self {
        Self {
            engine: Mutex::new(ConversationEngine::new()),
            last_active: std::sync::Mutex::new(Utc::now()),
        }
    }

    pub fn touch(&self) {
        if let Ok(mut last_active) = self.last_active.lock() {
            *last_active = Utc::now();
        }
    }

    fn idle_since(&self) -> DateTime<Utc> {
        self.last_active
            .lock()
            .map(|t| *t)
            .unwrap_or_else(|_| Utc::now())
    }
}

#[derive(Default)]
pub struct ChatRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<ChatSession>>>,
}

impl ChatRegistry {
    /// Creates a new session with its greeting already in the transcript.
    pub async fn create(&self) -> (Uuid, Arc<ChatSession>) {
        let session = Arc::new(ChatSession::new());
        session.engine.lock().await.start();

        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        let cutoff = Utc::now() - Duration::hours(CHAT_IDLE_LIMIT_HOURS);
        let before = sessions.len();
        sessions.retain(|_, s| s.idle_since() >= cutoff);
        if sessions.len() < before {
            info!("Dropped {} idle chat sessions", before - sessions.len());
        }
        sessions.insert(id, session.clone());
        (id, session)
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<ChatSession>> {
        let session = self.sessions.read().await.get(&id).cloned();
        if let Some(s) = &session {
            s.touch();
        }
        session
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
