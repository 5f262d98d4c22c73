//! Task entity: a single todo item.
//!
//! Invariant: `completed_at` is present iff `status == Completed`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

/// A stored task with its assigned id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Mark the task completed, stamping `completed_at`.
    pub fn mark_complete(&mut self) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(Utc::now());
    }
}

/// Validated input for task creation.
///
/// Construction is the single validation point: titles are trimmed and must
/// be 1–200 chars; descriptions are trimmed, capped at 1000 chars, and an
/// empty description normalizes to `None`. Nothing reaches a store without
/// passing through here.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
}

impl NewTask {
    pub fn new(title: &str, description: Option<&str>) -> Result<Self, AppError> {
        Ok(Self {
            title: validate_title(title)?,
            description: validate_description(description)?,
        })
    }
}

/// Trim and bounds-check a title.
pub fn validate_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title cannot be empty".into()));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "title cannot exceed {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

/// Trim and bounds-check a description; empty becomes `None`.
pub fn validate_description(description: Option<&str>) -> Result<Option<String>, AppError> {
    match description {
        None => Ok(None),
        Some(d) => {
            let d = d.trim();
            if d.is_empty() {
                return Ok(None);
            }
            if d.chars().count() > DESCRIPTION_MAX_CHARS {
                return Err(AppError::Validation(format!(
                    "description cannot exceed {DESCRIPTION_MAX_CHARS} characters"
                )));
            }
            Ok(Some(d.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_trims_title() {
        let t = NewTask::new("  buy milk  ", None).unwrap();
        assert_eq!(t.title, "buy milk");
    }

    #[test]
    fn empty_title_rejected() {
        assert!(NewTask::new("", None).is_err());
        assert!(NewTask::new("   ", None).is_err());
    }

    #[test]
    fn overlong_title_rejected() {
        let long = "x".repeat(201);
        assert!(NewTask::new(&long, None).is_err());
        let max = "x".repeat(200);
        assert!(NewTask::new(&max, None).is_ok());
    }

    #[test]
    fn empty_description_normalizes_to_none() {
        let t = NewTask::new("t", Some("   ")).unwrap();
        assert_eq!(t.description, None);
    }

    #[test]
    fn overlong_description_rejected() {
        let long = "d".repeat(1001);
        assert!(NewTask::new("t", Some(&long)).is_err());
    }

    #[test]
    fn mark_complete_sets_status_and_timestamp() {
        let mut task = Task {
            id: 1,
            title: "t".into(),
            description: None,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        };
        assert!(task.completed_at.is_none());

        task.mark_complete();
        assert_eq!(task.status, TaskStatus::Completed);
        let done_at = task.completed_at.expect("completed_at set");
        assert!(done_at >= task.created_at);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TaskStatus::Pending).unwrap(), "\"pending\"");
        assert_eq!(TaskStatus::parse("completed"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::parse("active"), None);
    }
}
