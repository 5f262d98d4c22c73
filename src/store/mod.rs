//! Task persistence capability and its implementations.
//!
//! [`TaskStore`] is the seam between the domain and storage: one in-memory
//! variant (CLI, tests) and one SQLite variant (server), chosen at
//! construction time. Callers hold `Arc<dyn TaskStore>` or the concrete
//! type — never inspect which one they got.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryTaskStore;
pub use sqlite::SqliteStore;

use crate::domain::{NewTask, Task};
use crate::error::AppError;

/// CRUD capability over the task collection.
///
/// `get_all` returns tasks in creation order. `update` replaces the stored
/// row for `task.id` and errors with [`AppError::TaskNotFound`] if the id
/// does not exist. `delete` reports whether a row was removed.
pub trait TaskStore: Send + Sync {
    fn add(&self, new: NewTask) -> Result<Task, AppError>;
    fn get_by_id(&self, id: i64) -> Result<Option<Task>, AppError>;
    fn get_all(&self) -> Result<Vec<Task>, AppError>;
    fn update(&self, task: &Task) -> Result<Task, AppError>;
    fn delete(&self, id: i64) -> Result<bool, AppError>;
}
