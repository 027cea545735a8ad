//! Chat endpoint: one conversational turn per request.

use axum::Json;
use axum::extract::State;
use cb_dialogue::EMPTY_MESSAGE_REPLY;
use cb_protocol::ConversationState;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, ChatMessage, DEFAULT_SESSION};

/// Longest message accepted, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Request body for a chat turn.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Defaults to `"default"`.
    #[serde(default)]
    pub session_id: Option<String>,
    /// IANA zone; the server default when absent.
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub status: &'static str,
    pub conversation_context: ConversationState,
}

/// POST /api/v1/chat: process one user message.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let session_id = req
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_SESSION)
        .to_string();
    let message = req.message.trim();

    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "message exceeds {MAX_MESSAGE_CHARS} characters"
        )));
    }

    if message.is_empty() {
        let context = match state.find(&session_id).await {
            Some(session) => session.lock().await.state.clone(),
            None => ConversationState::default(),
        };
        return Ok(Json(ChatResponse {
            response: EMPTY_MESSAGE_REPLY.to_string(),
            status: "success",
            conversation_context: context,
        }));
    }

    let session = state.session(&session_id).await;
    let mut session = session.lock().await;
    session.messages.push(ChatMessage::user(message));
    tracing::info!(session_id = %session_id, message = %message, "processing message");

    let current = std::mem::take(&mut session.state);
    let (reply, updated) = state
        .engine
        .process_turn(current, message, req.timezone.as_deref())
        .await;
    session.state = updated;
    session.messages.push(ChatMessage::assistant(&reply));
    tracing::info!(session_id = %session_id, response = %reply, "agent replied");

    Ok(Json(ChatResponse {
        response: reply,
        status: "success",
        conversation_context: session.state.clone(),
    }))
}
