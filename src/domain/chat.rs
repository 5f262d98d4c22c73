//! Chat history entities: conversations and their append-only messages.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const CONTENT_MAX_CHARS: usize = 4000;

/// Message author role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }
}

/// One chat session, correlated by a client-chosen opaque `session_id`.
/// `updated_at` is bumped on every turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single message within a conversation. Append-only; ordered by
/// creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub metadata: Option<HashMap<String, String>>,
}

/// Bounds-check message content before it reaches the store.
pub fn validate_content(content: &str) -> Result<(), AppError> {
    if content.chars().count() > CONTENT_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "message content cannot exceed {CONTENT_MAX_CHARS} characters"
        )));
    }
    Ok(())
}
