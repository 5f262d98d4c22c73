//! Natural-language task agent.
//!
//! The pipeline for one chat turn:
//!   parse intent (always rule-based) → generate a reply (LLM if configured,
//!   templates otherwise) → execute the matching task tool → persist both
//!   messages → return the outcome.
//!
//! [`ChatAgent`] owns reply generation and the LLM fallback policy;
//! [`ChatService`] owns the turn orchestration and conversation persistence.

pub mod intent;
pub mod templates;
pub mod tools;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Value, json};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{Role, Task};
use crate::error::AppError;
use crate::llm::{LlmProvider, ProviderError};
use crate::store::SqliteStore;
use intent::Intent;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("ai service temporarily unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Internal(#[from] AppError),
}

// ── Reply generation ──────────────────────────────────────────────────────────

/// Generates the assistant's reply text for a classified intent.
///
/// With no provider configured this is pure template lookup. With a
/// provider, the LLM is asked for a phrasing and templates remain the
/// fallback for empty output and request failures; rate limits and
/// unavailability are surfaced so the HTTP layer can map them.
#[derive(Debug, Clone)]
pub struct ChatAgent {
    provider: Option<LlmProvider>,
}

impl ChatAgent {
    pub fn new(provider: Option<LlmProvider>) -> Self {
        Self { provider }
    }

    /// Mode tag for health reporting.
    pub fn mode(&self) -> &'static str {
        match &self.provider {
            Some(p) => p.mode(),
            None => "rule_based",
        }
    }

    pub async fn respond(
        &self,
        intent: &Intent,
        original_message: &str,
    ) -> Result<String, ChatError> {
        let Some(provider) = &self.provider else {
            return Ok(templates::render(intent, original_message));
        };

        let prompt = build_prompt(intent);
        match provider.generate(&prompt).await {
            Ok(text) if !text.is_empty() => Ok(text),
            Ok(_) => Ok(templates::render(intent, original_message)),
            Err(ProviderError::RateLimited(_)) => Err(ChatError::RateLimited),
            Err(ProviderError::Unavailable(msg)) => Err(ChatError::Unavailable(msg)),
            Err(e) => {
                warn!("llm generation failed, using template reply: {e}");
                Ok(templates::render(intent, original_message))
            }
        }
    }
}

fn build_prompt(intent: &Intent) -> String {
    format!(
        "You are a helpful AI assistant for a Todo application.\n\
         You speak English and Roman Urdu (Hindi/Urdu written in Latin script).\n\
         Be friendly, concise, and helpful.\n\
         \n\
         Your task is to respond to the user based on their intent and extracted data.\n\
         \n\
         Examples:\n\
         - If intent is \"create_task\", confirm the task was created\n\
         - If intent is \"list_tasks\", show the tasks\n\
         - If intent is \"delete_task\", confirm deletion\n\
         - If user speaks Roman Urdu, respond in Roman Urdu\n\
         \n\
         Detected intent: {}\n\
         Extracted data: {}\n\
         \n\
         Generate a friendly, natural response (2-3 sentences max).",
        intent.name(),
        extracted_data(intent),
    )
}

fn extracted_data(intent: &Intent) -> Value {
    match intent {
        Intent::CreateTask { title, description, .. } => {
            json!({"title": title, "description": description})
        }
        Intent::ListTasks { status } => json!({"status": status}),
        Intent::SummarizeTasks | Intent::Help => json!({}),
        Intent::CompleteTask { task_id } => json!({"task_id": task_id}),
        Intent::DeleteTask { task_id } => json!({"task_id": task_id}),
        Intent::UpdateTask { task_id, new_title } => {
            json!({"task_id": task_id, "new_title": new_title})
        }
        Intent::Unknown { original_message } => json!({"original_message": original_message}),
    }
}

// ── Turn orchestration ────────────────────────────────────────────────────────

/// Everything one chat turn produced, ready for serialization.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub response: String,
    pub action: Option<&'static str>,
    pub task: Option<Task>,
    pub tasks: Option<Vec<Task>>,
    pub conversation_id: i64,
    pub intent: &'static str,
    pub mode: &'static str,
}

/// Orchestrates one chat turn end to end against the SQLite store.
#[derive(Clone)]
pub struct ChatService {
    store: Arc<SqliteStore>,
    agent: ChatAgent,
}

impl ChatService {
    pub fn new(store: Arc<SqliteStore>, agent: ChatAgent) -> Self {
        Self { store, agent }
    }

    pub fn mode(&self) -> &'static str {
        self.agent.mode()
    }

    /// Run one turn. The user message is persisted before reply generation,
    /// so a rate-limited or unavailable provider still leaves the user's
    /// side of the exchange in history.
    pub async fn handle_turn(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<TurnOutcome, ChatError> {
        let conversation = self.store.get_or_create_conversation(session_id)?;
        self.store.append_message(conversation.id, Role::User, message, None)?;

        let intent = intent::parse(message);
        info!(intent = intent.name(), conversation = conversation.id, "chat turn");

        let mut response = self.agent.respond(&intent, message).await?;
        let mut action: Option<&'static str> = None;
        let mut task: Option<Task> = None;
        let mut tasks: Option<Vec<Task>> = None;

        match &intent {
            Intent::CreateTask { title, description, .. } => {
                let created =
                    tools::create_task(self.store.as_ref(), title, Some(description.as_str()))?;
                action = Some("task_created");
                // Keep an LLM reply that already confirms creation; replace
                // anything else with the canonical confirmation.
                let lowered = response.to_lowercase();
                if !lowered.contains("ban gaya") && !lowered.contains("created") {
                    response = format!("✅ Task created: '{}'", created.title);
                }
                task = Some(created);
            }
            Intent::ListTasks { status } => {
                let listed = tools::list_tasks(self.store.as_ref(), status.as_deref())?;
                action = Some("tasks_listed");
                let count = listed.len();
                response = format!("📋 You have {count} task{}", if count != 1 { "s" } else { "" });
                if let Some(word) = status {
                    response.push_str(&format!(" with status '{word}'"));
                }
                tasks = Some(listed);
            }
            Intent::SummarizeTasks => {
                let summary = tools::summarize_tasks(self.store.as_ref())?;
                action = Some("tasks_summarized");
                response = format!(
                    "📊 You have {} tasks: {} pending, {} completed",
                    summary.total, summary.pending, summary.completed
                );
                tasks = Some(summary.pending_tasks);
            }
            Intent::DeleteTask { task_id } => {
                let lowered = message.to_lowercase();
                if lowered.contains("yes") || lowered.contains("confirm") {
                    if tools::delete_task(self.store.as_ref(), *task_id)? {
                        action = Some("task_deleted");
                        response = format!("🗑️ Task #{task_id} has been deleted");
                    } else {
                        response = format!("❌ Task #{task_id} not found");
                    }
                } else if let Some(found) = tools::get_task(self.store.as_ref(), *task_id)? {
                    action = Some("delete_confirmation");
                    response = format!(
                        "⚠️ Are you sure you want to delete '{}'? Reply 'yes' to confirm",
                        found.title
                    );
                } else {
                    response = format!("❌ Task #{task_id} not found");
                }
            }
            Intent::CompleteTask { task_id } => {
                match tools::complete_task(self.store.as_ref(), *task_id)? {
                    Some(done) => {
                        action = Some("task_completed");
                        response =
                            format!("✅ Great job! Task '{}' marked complete!", done.title);
                        task = Some(done);
                    }
                    None => response = "❌ Task not found".to_string(),
                }
            }
            Intent::UpdateTask { task_id, new_title } => {
                match tools::update_task(self.store.as_ref(), *task_id, new_title)? {
                    Some(updated) => {
                        action = Some("task_updated");
                        response = format!("✏️ Task updated to: '{}'", updated.title);
                        task = Some(updated);
                    }
                    None => response = "❌ Task not found".to_string(),
                }
            }
            Intent::Help => action = Some("help_provided"),
            Intent::Unknown { .. } => action = Some("unknown_intent"),
        }

        let mut metadata = HashMap::from([
            ("intent".to_string(), intent.name().to_string()),
            ("mode".to_string(), self.agent.mode().to_string()),
        ]);
        if let Some(tag) = action {
            metadata.insert("action".to_string(), tag.to_string());
        }
        self.store.append_message(conversation.id, Role::Assistant, &response, Some(metadata))?;
        self.store.touch_conversation(conversation.id)?;

        Ok(TurnOutcome {
            response,
            action,
            task,
            tasks,
            conversation_id: conversation.id,
            intent: intent.name(),
            mode: self.agent.mode(),
        })
    }
}
