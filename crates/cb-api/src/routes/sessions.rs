//! Session history and management endpoints.

use axum::Json;
use axum::extract::{Path, State};
use cb_protocol::ConversationState;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, ChatMessage};

/// Full history of one session.
#[derive(Debug, Serialize)]
pub struct ConversationView {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
    pub context: ConversationState,
}

#[derive(Debug, Serialize)]
pub struct SessionList {
    pub active_sessions: Vec<String>,
    pub total_sessions: usize,
}

fn not_found(session_id: &str) -> ApiError {
    ApiError::NotFound(format!("session '{session_id}' not found"))
}

/// GET /api/v1/conversations/{session_id}: message history and context.
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ConversationView>> {
    let session = state
        .find(&session_id)
        .await
        .ok_or_else(|| not_found(&session_id))?;
    let session = session.lock().await;

    Ok(Json(ConversationView {
        session_id,
        messages: session.messages.clone(),
        context: session.state.clone(),
    }))
}

/// DELETE /api/v1/conversations/{session_id}: forget a session.
pub async fn clear_conversation(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Value>> {
    if !state.remove(&session_id).await {
        return Err(not_found(&session_id));
    }
    tracing::info!(session_id = %session_id, "session cleared");
    Ok(Json(json!({
        "message": format!("Conversation {session_id} cleared successfully"),
    })))
}

/// GET /api/v1/sessions: list live sessions.
pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionList> {
    let active_sessions = state.session_ids().await;
    Json(SessionList {
        total_sessions: active_sessions.len(),
        active_sessions,
    })
}
