//! Shared application state for the Axum server.
//!
//! Sessions live in memory only. The map lock is held just long enough to
//! find or insert a session; each session has its own mutex so turns for
//! one session run one at a time while other sessions proceed.

use std::collections::HashMap;
use std::sync::Arc;

use cb_dialogue::{CalendarBackend, DialogueEngine, FallbackResponder, MockCalendar, StaticFallback};
use cb_protocol::ConversationState;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

/// Session used when a request names none.
pub const DEFAULT_SESSION: &str = "default";

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in a session's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
        }
    }

    pub fn assistant(content: &str) -> Self {
        Self {
            role: Role::Assistant,
            content: content.to_string(),
        }
    }
}

/// Message history plus dialogue state for one session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub messages: Vec<ChatMessage>,
    pub state: ConversationState,
}

pub type SharedSession = Arc<Mutex<Session>>;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DialogueEngine>,
    sessions: Arc<RwLock<HashMap<String, SharedSession>>>,
}

impl AppState {
    pub fn new(engine: DialogueEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// State over the given calendar with canned fallback replies.
    pub fn with_calendar(calendar: Arc<dyn CalendarBackend>, tz: Tz) -> Self {
        let fallback: Arc<dyn FallbackResponder> = Arc::new(StaticFallback);
        Self::new(DialogueEngine::new(calendar, fallback, tz))
    }

    /// In-memory calendar in Asia/Kolkata (development and tests).
    pub fn in_memory() -> Self {
        Self::with_calendar(Arc::new(MockCalendar::new()), chrono_tz::Asia::Kolkata)
    }

    /// Fetch a session, creating it on first use.
    pub async fn session(&self, id: &str) -> SharedSession {
        if let Some(session) = self.sessions.read().await.get(id) {
            return session.clone();
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                tracing::info!(session_id = %id, "session created");
                Arc::new(Mutex::new(Session::default()))
            })
            .clone()
    }

    /// Fetch an existing session.
    pub async fn find(&self, id: &str) -> Option<SharedSession> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Drop a session. Returns false if it did not exist.
    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Ids of all live sessions, sorted.
    pub async fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory()
    }
}
