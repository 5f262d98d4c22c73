//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("task with id {0} not found")]
    TaskNotFound(i64),

    #[error("conversation not found for session: {0}")]
    ConversationNotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
