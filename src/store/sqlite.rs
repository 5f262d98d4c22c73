//! SQLite-backed store — tasks plus conversation/message history.
//!
//! A connection is opened per operation; SQLite itself is the sole
//! serialization point (single-row writes, no cross-entity transactions).
//! Timestamps are stored as RFC 3339 text, message metadata as a JSON text
//! column.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::domain::chat::{Conversation, Message, Role, validate_content};
use crate::domain::{NewTask, Task, TaskStatus};
use crate::error::AppError;
use super::TaskStore;

#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and ensure the
    /// schema exists.
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Store(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let store = Self { db_path: path.to_path_buf() };
        store.init_db()?;
        Ok(store)
    }

    fn conn(&self) -> Result<Connection, AppError> {
        Connection::open(&self.db_path)
            .map_err(|e| AppError::Store(format!("cannot open {}: {e}", self.db_path.display())))
    }

    fn init_db(&self) -> Result<(), AppError> {
        let conn = self.conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                 id           INTEGER PRIMARY KEY AUTOINCREMENT,
                 title        TEXT NOT NULL,
                 description  TEXT,
                 status       TEXT NOT NULL DEFAULT 'pending',
                 created_at   TEXT NOT NULL,
                 completed_at TEXT
             );
             CREATE TABLE IF NOT EXISTS conversations (
                 id         INTEGER PRIMARY KEY AUTOINCREMENT,
                 session_id TEXT NOT NULL,
                 created_at TEXT NOT NULL,
                 updated_at TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_conversations_session
                 ON conversations(session_id);
             CREATE TABLE IF NOT EXISTS messages (
                 id              INTEGER PRIMARY KEY AUTOINCREMENT,
                 conversation_id INTEGER NOT NULL REFERENCES conversations(id),
                 role            TEXT NOT NULL,
                 content         TEXT NOT NULL,
                 created_at      TEXT NOT NULL,
                 metadata        TEXT
             );
             CREATE INDEX IF NOT EXISTS idx_messages_conversation
                 ON messages(conversation_id);",
        )
        .map_err(|e| AppError::Store(format!("schema init failed: {e}")))
    }

    // ── Conversations ─────────────────────────────────────────────────

    pub fn get_conversation(&self, session_id: &str) -> Result<Option<Conversation>, AppError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, session_id, created_at, updated_at FROM conversations
             WHERE session_id = ?1 ORDER BY id LIMIT 1",
            params![session_id],
            conversation_from_row,
        )
        .optional()
        .map_err(|e| AppError::Store(format!("get_conversation: {e}")))
    }

    /// Get-or-create keyed by exact, case-sensitive `session_id`.
    ///
    /// Select-then-insert: two concurrent first messages for the same
    /// session can still race and create two conversations (known open
    /// question, matching the source behavior).
    pub fn get_or_create_conversation(&self, session_id: &str) -> Result<Conversation, AppError> {
        if let Some(existing) = self.get_conversation(session_id)? {
            return Ok(existing);
        }

        let now = now_str();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO conversations (session_id, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![session_id, now],
        )
        .map_err(|e| AppError::Store(format!("create conversation: {e}")))?;

        let id = conn.last_insert_rowid();
        let ts = parse_ts(&now)?;
        Ok(Conversation {
            id,
            session_id: session_id.to_string(),
            created_at: ts,
            updated_at: ts,
        })
    }

    /// Bump `updated_at` to now.
    pub fn touch_conversation(&self, id: i64) -> Result<(), AppError> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE conversations SET updated_at = ?1 WHERE id = ?2",
            params![now_str(), id],
        )
        .map_err(|e| AppError::Store(format!("touch_conversation: {e}")))?;
        Ok(())
    }

    // ── Messages ──────────────────────────────────────────────────────

    pub fn append_message(
        &self,
        conversation_id: i64,
        role: Role,
        content: &str,
        metadata: Option<HashMap<String, String>>,
    ) -> Result<Message, AppError> {
        validate_content(content)?;

        let metadata_json = match &metadata {
            Some(m) => Some(
                serde_json::to_string(m)
                    .map_err(|e| AppError::Store(format!("serialize metadata: {e}")))?,
            ),
            None => None,
        };

        let now = now_str();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO messages (conversation_id, role, content, created_at, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![conversation_id, role.as_str(), content, now, metadata_json],
        )
        .map_err(|e| AppError::Store(format!("append_message: {e}")))?;

        Ok(Message {
            id: conn.last_insert_rowid(),
            conversation_id,
            role,
            content: content.to_string(),
            created_at: parse_ts(&now)?,
            metadata,
        })
    }

    /// The most recent `limit` messages of a conversation, returned in
    /// chronological order.
    pub fn latest_messages(
        &self,
        conversation_id: i64,
        limit: usize,
    ) -> Result<Vec<Message>, AppError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, conversation_id, role, content, created_at, metadata
                 FROM messages WHERE conversation_id = ?1
                 ORDER BY created_at DESC, id DESC LIMIT ?2",
            )
            .map_err(|e| AppError::Store(format!("prepare latest_messages: {e}")))?;

        let rows = stmt
            .query_map(params![conversation_id, limit as i64], message_from_row)
            .map_err(|e| AppError::Store(format!("latest_messages: {e}")))?;

        let mut messages = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Store(format!("latest_messages row: {e}")))?;
        messages.reverse();
        Ok(messages)
    }
}

impl TaskStore for SqliteStore {
    fn add(&self, new: NewTask) -> Result<Task, AppError> {
        let now = now_str();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO tasks (title, description, status, created_at) VALUES (?1, ?2, 'pending', ?3)",
            params![new.title, new.description, now],
        )
        .map_err(|e| AppError::Store(format!("insert task: {e}")))?;

        Ok(Task {
            id: conn.last_insert_rowid(),
            title: new.title,
            description: new.description,
            status: TaskStatus::Pending,
            created_at: parse_ts(&now)?,
            completed_at: None,
        })
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Task>, AppError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, title, description, status, created_at, completed_at
             FROM tasks WHERE id = ?1",
            params![id],
            task_from_row,
        )
        .optional()
        .map_err(|e| AppError::Store(format!("get task {id}: {e}")))
    }

    fn get_all(&self) -> Result<Vec<Task>, AppError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, title, description, status, created_at, completed_at
                 FROM tasks ORDER BY created_at, id",
            )
            .map_err(|e| AppError::Store(format!("prepare get_all: {e}")))?;

        let rows = stmt
            .query_map([], task_from_row)
            .map_err(|e| AppError::Store(format!("get_all: {e}")))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Store(format!("get_all row: {e}")))
    }

    fn update(&self, task: &Task) -> Result<Task, AppError> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE tasks SET title = ?1, description = ?2, status = ?3, completed_at = ?4
                 WHERE id = ?5",
                params![
                    task.title,
                    task.description,
                    task.status.as_str(),
                    task.completed_at.map(ts_str),
                    task.id,
                ],
            )
            .map_err(|e| AppError::Store(format!("update task {}: {e}", task.id)))?;

        if changed == 0 {
            return Err(AppError::TaskNotFound(task.id));
        }
        Ok(task.clone())
    }

    fn delete(&self, id: i64) -> Result<bool, AppError> {
        let conn = self.conn()?;
        let changed = conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])
            .map_err(|e| AppError::Store(format!("delete task {id}: {e}")))?;
        Ok(changed > 0)
    }
}

// ── Row mapping ───────────────────────────────────────────────────────────────

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let status_str: String = row.get(3)?;
    let created_at: String = row.get(4)?;
    let completed_at: Option<String> = row.get(5)?;
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: TaskStatus::parse(&status_str).unwrap_or(TaskStatus::Pending),
        created_at: parse_ts_sql(4, &created_at)?,
        completed_at: completed_at.as_deref().map(|s| parse_ts_sql(5, s)).transpose()?,
    })
}

fn conversation_from_row(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    let created_at: String = row.get(2)?;
    let updated_at: String = row.get(3)?;
    Ok(Conversation {
        id: row.get(0)?,
        session_id: row.get(1)?,
        created_at: parse_ts_sql(2, &created_at)?,
        updated_at: parse_ts_sql(3, &updated_at)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    let role_str: String = row.get(2)?;
    let created_at: String = row.get(4)?;
    let metadata_json: Option<String> = row.get(5)?;
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        role: Role::parse(&role_str).unwrap_or(Role::System),
        content: row.get(3)?,
        created_at: parse_ts_sql(4, &created_at)?,
        metadata: metadata_json.and_then(|j| serde_json::from_str(&j).ok()),
    })
}

// ── Timestamps ────────────────────────────────────────────────────────────────

fn now_str() -> String {
    ts_str(Utc::now())
}

fn ts_str(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| AppError::Store(format!("malformed timestamp '{s}': {e}")))
}

fn parse_ts_sql(col: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SqliteStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    fn add(store: &SqliteStore, title: &str) -> Task {
        store.add(NewTask::new(title, None).unwrap()).unwrap()
    }

    #[test]
    fn task_crud_round_trip() {
        let (_dir, store) = setup();

        let created = store
            .add(NewTask::new("buy milk", Some("from the corner shop")).unwrap())
            .unwrap();
        assert!(created.id > 0);
        assert_eq!(created.status, TaskStatus::Pending);
        assert!(created.completed_at.is_none());

        let fetched = store.get_by_id(created.id).unwrap().unwrap();
        assert_eq!(fetched.title, "buy milk");
        assert_eq!(fetched.description.as_deref(), Some("from the corner shop"));
        assert_eq!(fetched.created_at, created.created_at);

        assert!(store.delete(created.id).unwrap());
        assert!(store.get_by_id(created.id).unwrap().is_none());
        assert!(!store.delete(created.id).unwrap());
    }

    #[test]
    fn get_all_in_creation_order() {
        let (_dir, store) = setup();
        add(&store, "a");
        add(&store, "b");
        add(&store, "c");
        let titles: Vec<_> = store.get_all().unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, ["a", "b", "c"]);
    }

    #[test]
    fn complete_persists_timestamp() {
        let (_dir, store) = setup();
        let mut task = add(&store, "finish report");
        task.mark_complete();
        store.update(&task).unwrap();

        let fetched = store.get_by_id(task.id).unwrap().unwrap();
        assert_eq!(fetched.status, TaskStatus::Completed);
        let done_at = fetched.completed_at.expect("completed_at stored");
        assert!(done_at >= fetched.created_at);
    }

    #[test]
    fn update_unknown_id_errors() {
        let (_dir, store) = setup();
        let mut task = add(&store, "t");
        task.id = 404;
        assert!(matches!(store.update(&task), Err(AppError::TaskNotFound(404))));
    }

    #[test]
    fn conversation_get_or_create_is_idempotent_per_session() {
        let (_dir, store) = setup();

        assert!(store.get_conversation("sess-1").unwrap().is_none());
        let a = store.get_or_create_conversation("sess-1").unwrap();
        let b = store.get_or_create_conversation("sess-1").unwrap();
        assert_eq!(a.id, b.id);

        // Case-sensitive exact match: different case = different conversation.
        let c = store.get_or_create_conversation("SESS-1").unwrap();
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn messages_append_and_read_back_in_order() {
        let (_dir, store) = setup();
        let conv = store.get_or_create_conversation("s").unwrap();

        store.append_message(conv.id, Role::User, "hello", None).unwrap();
        let mut meta = HashMap::new();
        meta.insert("intent".to_string(), "help".to_string());
        store
            .append_message(conv.id, Role::Assistant, "hi there", Some(meta))
            .unwrap();

        let messages = store.latest_messages(conv.id, 50).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(
            messages[1].metadata.as_ref().unwrap().get("intent").unwrap(),
            "help"
        );
    }

    #[test]
    fn latest_messages_honors_limit_keeping_newest() {
        let (_dir, store) = setup();
        let conv = store.get_or_create_conversation("s").unwrap();
        for i in 0..6 {
            store
                .append_message(conv.id, Role::User, &format!("msg{i}"), None)
                .unwrap();
        }

        let messages = store.latest_messages(conv.id, 3).unwrap();
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["msg3", "msg4", "msg5"]);
    }

    #[test]
    fn overlong_message_content_rejected() {
        let (_dir, store) = setup();
        let conv = store.get_or_create_conversation("s").unwrap();
        let res = store.append_message(conv.id, Role::User, &"x".repeat(4001), None);
        assert!(matches!(res, Err(AppError::Validation(_))));
    }

    #[test]
    fn touch_bumps_updated_at() {
        let (_dir, store) = setup();
        let conv = store.get_or_create_conversation("s").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.touch_conversation(conv.id).unwrap();
        let after = store.get_conversation("s").unwrap().unwrap();
        assert!(after.updated_at > conv.updated_at);
    }
}
