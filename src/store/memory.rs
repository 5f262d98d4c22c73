//! In-memory [`TaskStore`] — backs the offline CLI and unit tests.
//!
//! Tasks live in a `Vec` in creation order; ids are assigned from a
//! monotonically increasing counter and never reused within a process.

use std::sync::Mutex;

use chrono::Utc;

use crate::domain::{NewTask, Task, TaskStatus};
use crate::error::AppError;
use super::TaskStore;

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    tasks: Vec<Task>,
}

#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    inner: Mutex<Inner>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, AppError> {
        self.inner
            .lock()
            .map_err(|_| AppError::Store("task store mutex poisoned".into()))
    }
}

impl TaskStore for MemoryTaskStore {
    fn add(&self, new: NewTask) -> Result<Task, AppError> {
        let mut inner = self.lock()?;
        inner.next_id += 1;
        let task = Task {
            id: inner.next_id,
            title: new.title,
            description: new.description,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        };
        inner.tasks.push(task.clone());
        Ok(task)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Task>, AppError> {
        let inner = self.lock()?;
        Ok(inner.tasks.iter().find(|t| t.id == id).cloned())
    }

    fn get_all(&self) -> Result<Vec<Task>, AppError> {
        let inner = self.lock()?;
        Ok(inner.tasks.clone())
    }

    fn update(&self, task: &Task) -> Result<Task, AppError> {
        let mut inner = self.lock()?;
        match inner.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => {
                *slot = task.clone();
                Ok(task.clone())
            }
            None => Err(AppError::TaskNotFound(task.id)),
        }
    }

    fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut inner = self.lock()?;
        let before = inner.tasks.len();
        inner.tasks.retain(|t| t.id != id);
        Ok(inner.tasks.len() < before)
    }
}
