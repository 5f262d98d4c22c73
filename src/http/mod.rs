//! Axum HTTP surface.
//!
//! ## URL layout
//!
//! ```text
//! GET    /                              → service banner
//! GET    /health                        → liveness
//! GET    /tasks            POST /tasks  → task collection
//! GET    /tasks/{id}       PUT  /tasks/{id}   DELETE /tasks/{id}
//! PATCH  /tasks/{id}/complete
//! POST   /chat                          → one natural-language turn
//! GET    /chat/history/{session_id}     → latest 50 messages
//! GET    /chat/health                   → chat mode status
//! ```
//!
//! Every error body is `{"detail": "..."}`. Validation failures (body
//! schema or field bounds) map to 422, missing resources to 404, provider
//! rate limits to 429, provider outage to 503, everything else to 500.

pub mod chat;
pub mod tasks;

use std::sync::Arc;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::agent::{ChatError, ChatService};
use crate::error::AppError;
use crate::store::SqliteStore;

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub chat: ChatService,
    /// How many messages `/chat/history` returns, from `[chat] history_limit`.
    pub history_limit: usize,
}

// ── Error mapping ─────────────────────────────────────────────────────────────

/// Handler-level error, carrying the HTTP status it serializes to.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Validation(String),
    RateLimited(String),
    Unavailable(String),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            // Internal details stay in the log.
            ApiError::Internal(msg) => {
                error!("internal error: {msg}");
                "internal server error".to_string()
            }
            ApiError::NotFound(d)
            | ApiError::Validation(d)
            | ApiError::RateLimited(d)
            | ApiError::Unavailable(d) => d,
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::TaskNotFound(id) => ApiError::NotFound(format!("Task with ID {id} not found")),
            AppError::ConversationNotFound(session_id) => {
                ApiError::NotFound(format!("Conversation not found for session: {session_id}"))
            }
            AppError::Validation(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::RateLimited => ApiError::RateLimited(
                "Rate limit exceeded. Please try again in a few minutes.".to_string(),
            ),
            ChatError::Unavailable(msg) => {
                ApiError::Unavailable(format!("AI service temporarily unavailable: {msg}"))
            }
            ChatError::Internal(inner) => inner.into(),
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/tasks", get(tasks::list).post(tasks::create))
        .route(
            "/tasks/{task_id}",
            get(tasks::get_one).put(tasks::update).delete(tasks::remove),
        )
        .route("/tasks/{task_id}/complete", patch(tasks::complete))
        .route("/chat", post(chat::chat_turn))
        .route("/chat/history/{session_id}", get(chat::history))
        .route("/chat/health", get(chat::chat_health))
        .with_state(state)
}

/// GET / — service banner.
async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "TaskDost API",
        "version": env!("CARGO_PKG_VERSION"),
        "features": [
            "Task CRUD operations",
            "AI Chatbot (natural language)",
            "Conversation history"
        ],
        "health": "/health",
        "chat": "/chat",
    }))
}

/// GET /health — process liveness.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

// ── Server loop ───────────────────────────────────────────────────────────────

/// Bind and serve until ctrl-c.
pub async fn serve(bind_addr: &str, state: AppState) -> Result<(), AppError> {
    let router = build_router(state);

    let listener = TcpListener::bind(bind_addr).await.map_err(AppError::Io)?;

    info!(%bind_addr, "http server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("ctrl-c handler failed: {e}");
            }
        })
        .await
        .map_err(AppError::Io)?;

    info!("http server shut down");
    Ok(())
}
