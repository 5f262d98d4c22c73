//! Task operations exposed to the chat agent.
//!
//! Thin wrappers over [`TaskStore`] with chat-friendly return shapes:
//! missing tasks come back as `Ok(None)` / `Ok(false)` rather than errors,
//! so the orchestrator can phrase a "not found" reply instead of failing
//! the turn.

use serde::Serialize;

use crate::domain::{NewTask, Task, TaskStatus, task};
use crate::error::AppError;
use crate::store::TaskStore;

/// How many example tasks a summary carries per status bucket.
const SUMMARY_EXAMPLES: usize = 5;

/// Aggregate counts plus a preview of tasks per bucket.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub pending_tasks: Vec<Task>,
    pub completed_tasks: Vec<Task>,
}

/// Create a task from parsed chat text. Parsed titles can exceed the
/// domain caps (the capture is the whole message tail), so both fields
/// are clipped before validation.
pub fn create_task(
    store: &dyn TaskStore,
    title: &str,
    description: Option<&str>,
) -> Result<Task, AppError> {
    let title = clip(title, task::TITLE_MAX_CHARS);
    let description = description.map(|d| clip(d, task::DESCRIPTION_MAX_CHARS));
    store.add(NewTask::new(&title, description.as_deref())?)
}

/// List tasks, optionally filtered by a raw status word. The filter is a
/// literal string comparison against the stored status, so a word that is
/// not an actual status (e.g. `active`) matches nothing.
pub fn list_tasks(store: &dyn TaskStore, status: Option<&str>) -> Result<Vec<Task>, AppError> {
    let tasks = store.get_all()?;
    match status {
        Some(word) => Ok(tasks.into_iter().filter(|t| t.status.as_str() == word).collect()),
        None => Ok(tasks),
    }
}

pub fn get_task(store: &dyn TaskStore, task_id: i64) -> Result<Option<Task>, AppError> {
    store.get_by_id(task_id)
}

/// Mark a task completed. `Ok(None)` when the id does not exist.
pub fn complete_task(store: &dyn TaskStore, task_id: i64) -> Result<Option<Task>, AppError> {
    let Some(mut task) = store.get_by_id(task_id)? else {
        return Ok(None);
    };
    task.mark_complete();
    store.update(&task).map(Some)
}

/// Rename a task. `Ok(None)` when the id does not exist.
pub fn update_task(
    store: &dyn TaskStore,
    task_id: i64,
    new_title: &str,
) -> Result<Option<Task>, AppError> {
    let Some(mut task) = store.get_by_id(task_id)? else {
        return Ok(None);
    };
    task.title = task::validate_title(&clip(new_title, task::TITLE_MAX_CHARS))?;
    store.update(&task).map(Some)
}

/// Delete a task. `Ok(false)` when the id does not exist.
pub fn delete_task(store: &dyn TaskStore, task_id: i64) -> Result<bool, AppError> {
    store.delete(task_id)
}

/// Count tasks per status and keep the first few of each as examples.
pub fn summarize_tasks(store: &dyn TaskStore) -> Result<TaskSummary, AppError> {
    let tasks = store.get_all()?;
    let pending: Vec<Task> =
        tasks.iter().filter(|t| t.status == TaskStatus::Pending).cloned().collect();
    let completed: Vec<Task> =
        tasks.iter().filter(|t| t.status == TaskStatus::Completed).cloned().collect();
    Ok(TaskSummary {
        total: tasks.len(),
        pending: pending.len(),
        completed: completed.len(),
        pending_tasks: pending.into_iter().take(SUMMARY_EXAMPLES).collect(),
        completed_tasks: completed.into_iter().take(SUMMARY_EXAMPLES).collect(),
    })
}

fn clip(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTaskStore;

    fn seed(store: &MemoryTaskStore, n: usize) {
        for i in 0..n {
            create_task(store, &format!("task {i}"), None).unwrap();
        }
    }

    #[test]
    fn create_clips_overlong_title() {
        let store = MemoryTaskStore::new();
        let long = "x".repeat(500);
        let task = create_task(&store, &long, None).unwrap();
        assert_eq!(task.title.chars().count(), task::TITLE_MAX_CHARS);
    }

    #[test]
    fn list_filters_by_literal_status_word() {
        let store = MemoryTaskStore::new();
        seed(&store, 3);
        complete_task(&store, 2).unwrap();
        assert_eq!(list_tasks(&store, None).unwrap().len(), 3);
        assert_eq!(list_tasks(&store, Some("pending")).unwrap().len(), 2);
        assert_eq!(list_tasks(&store, Some("completed")).unwrap().len(), 1);
        // "active" is parseable as a filter word but is not a stored
        // status, so it matches nothing.
        assert_eq!(list_tasks(&store, Some("active")).unwrap().len(), 0);
    }

    #[test]
    fn list_preserves_creation_order_under_filter() {
        let store = MemoryTaskStore::new();
        seed(&store, 4);
        complete_task(&store, 2).unwrap();
        let ids: Vec<i64> =
            list_tasks(&store, Some("pending")).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, [1, 3, 4]);
    }

    #[test]
    fn complete_missing_task_is_none() {
        let store = MemoryTaskStore::new();
        assert!(complete_task(&store, 42).unwrap().is_none());
    }

    #[test]
    fn update_renames_and_reports_missing() {
        let store = MemoryTaskStore::new();
        seed(&store, 1);
        let updated = update_task(&store, 1, "Renamed").unwrap().unwrap();
        assert_eq!(updated.title, "Renamed");
        assert!(update_task(&store, 9, "Nope").unwrap().is_none());
    }

    #[test]
    fn delete_reports_removal() {
        let store = MemoryTaskStore::new();
        seed(&store, 1);
        assert!(delete_task(&store, 1).unwrap());
        assert!(!delete_task(&store, 1).unwrap());
    }

    #[test]
    fn summary_counts_and_caps_examples() {
        let store = MemoryTaskStore::new();
        seed(&store, 8);
        complete_task(&store, 1).unwrap();
        complete_task(&store, 2).unwrap();
        let summary = summarize_tasks(&store).unwrap();
        assert_eq!(summary.total, 8);
        assert_eq!(summary.pending, 6);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.pending_tasks.len(), 5);
        assert_eq!(summary.completed_tasks.len(), 2);
    }
}
