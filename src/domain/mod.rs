//! Domain entities — tasks and chat history.

pub mod chat;
pub mod task;

pub use chat::{Conversation, Message, Role};
pub use task::{NewTask, Task, TaskStatus};
