//! Handlers for `/chat` routes.

use std::collections::HashMap;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Message, Task};

use super::{ApiError, AppState};

const MESSAGE_MAX_CHARS: usize = 1000;
const SESSION_ID_MAX_CHARS: usize = 100;

// ── Request / response types ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(super) struct ChatRequest {
    message: String,
    session_id: String,
}

impl ChatRequest {
    fn validate(&self) -> Result<(), ApiError> {
        bounds("message", &self.message, MESSAGE_MAX_CHARS)?;
        bounds("session_id", &self.session_id, SESSION_ID_MAX_CHARS)
    }
}

fn bounds(field: &str, value: &str, max: usize) -> Result<(), ApiError> {
    let len = value.chars().count();
    if len == 0 {
        return Err(ApiError::Validation(format!("{field} cannot be empty")));
    }
    if len > max {
        return Err(ApiError::Validation(format!("{field} cannot exceed {max} characters")));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub(super) struct ChatResponse {
    response: String,
    action: Option<&'static str>,
    task: Option<Task>,
    tasks: Option<Vec<Task>>,
    conversation_id: i64,
    metadata: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub(super) struct MessageView {
    id: i64,
    role: &'static str,
    content: String,
    created_at: DateTime<Utc>,
    metadata: Option<HashMap<String, String>>,
}

impl From<Message> for MessageView {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            role: m.role.as_str(),
            content: m.content,
            created_at: m.created_at,
            metadata: m.metadata,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct HistoryResponse {
    session_id: String,
    messages: Vec<MessageView>,
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// POST /chat — one natural-language turn.
pub(super) async fn chat_turn(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    req.validate()?;

    let outcome = state.chat.handle_turn(&req.session_id, &req.message).await?;

    Ok(Json(ChatResponse {
        response: outcome.response,
        action: outcome.action,
        task: outcome.task,
        tasks: outcome.tasks,
        conversation_id: outcome.conversation_id,
        metadata: json!({
            "intent": outcome.intent,
            "original_message": req.message,
            "mode": outcome.mode,
        }),
    }))
}

/// GET /chat/history/{session_id} — latest messages, oldest first.
pub(super) async fn history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let Some(conversation) = state.store.get_conversation(&session_id)? else {
        return Err(ApiError::NotFound(format!(
            "Conversation not found for session: {session_id}"
        )));
    };

    let messages = state.store.latest_messages(conversation.id, state.history_limit)?;
    Ok(Json(HistoryResponse {
        session_id,
        messages: messages.into_iter().map(MessageView::from).collect(),
    }))
}

/// GET /chat/health — reports which response mode is active.
pub(super) async fn chat_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "chat",
        "mode": state.chat.mode(),
    }))
}
