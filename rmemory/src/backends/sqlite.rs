use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, NaiveTime, SecondsFormat, Utc};
use rchat::{ChatError, ChatMessage, ChatSummary, HistoryStore, StoredChat, retention_cutoff};
use rcommon::{BoxFuture, ChatId};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::error::MemoryError;

#[derive(Debug)]
pub struct SqliteHistoryStore {
    connection: Mutex<Connection>,
}

impl SqliteHistoryStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|error| {
                MemoryError::storage(format!(
                    "failed to create sqlite parent directory: {error}"
                ))
            })?;
        }

        let connection = Connection::open(path).map_err(|error| {
            MemoryError::storage(format!("failed to open sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    pub fn new_in_memory() -> Result<Self, MemoryError> {
        let connection = Connection::open_in_memory().map_err(|error| {
            MemoryError::storage(format!("failed to open in-memory sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self, MemoryError> {
        connection
            .busy_timeout(Duration::from_secs(5))
            .map_err(|error| {
                MemoryError::storage(format!("failed to configure sqlite busy timeout: {error}"))
            })?;
        let store = Self {
            connection: Mutex::new(connection),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, MemoryError> {
        self.connection
            .lock()
            .map_err(|_| MemoryError::storage("sqlite history lock poisoned"))
    }

    fn initialize_schema(&self) -> Result<(), MemoryError> {
        let conn = self.connection()?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            CREATE TABLE IF NOT EXISTS chats (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                model TEXT NOT NULL,
                created_at TEXT NOT NULL,
                messages_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chats_created_at
            ON chats(created_at);
            ",
        )
        .map_err(|error| {
            MemoryError::storage(format!("failed to initialize sqlite schema: {error}"))
        })
    }

    fn save(&self, chat: &StoredChat) -> Result<(), MemoryError> {
        let messages_json = serde_json::to_string(&chat.messages).map_err(|error| {
            MemoryError::storage(format!("failed to serialize chat messages: {error}"))
        })?;

        let conn = self.connection()?;
        conn.execute(
            "
            INSERT INTO chats (id, title, model, created_at, messages_json)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                model = excluded.model,
                created_at = excluded.created_at,
                messages_json = excluded.messages_json
            ",
            params![
                chat.id.as_str(),
                chat.title,
                chat.model,
                encode_timestamp(chat.created_at),
                messages_json
            ],
        )
        .map_err(|error| MemoryError::storage(format!("failed to save chat: {error}")))?;

        Ok(())
    }

    fn load(&self, id: &ChatId) -> Result<Option<StoredChat>, MemoryError> {
        let conn = self.connection()?;
        let row = conn
            .query_row(
                "SELECT title, model, created_at, messages_json FROM chats WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(|error| MemoryError::storage(format!("failed to load chat: {error}")))?;

        let Some((title, model, created_at, messages_json)) = row else {
            return Ok(None);
        };
        let messages = serde_json::from_str::<Vec<ChatMessage>>(&messages_json).map_err(
            |error| MemoryError::storage(format!("failed to deserialize chat messages: {error}")),
        )?;

        Ok(Some(StoredChat {
            id: id.clone(),
            title,
            model,
            created_at: decode_timestamp(&created_at)?,
            messages,
        }))
    }

    fn recent(&self, limit: usize) -> Result<Vec<ChatSummary>, MemoryError> {
        let conn = self.connection()?;
        let mut statement = conn
            .prepare(
                "
                SELECT id, title, model, created_at
                FROM chats
                ORDER BY created_at DESC, id DESC
                LIMIT ?1
                ",
            )
            .map_err(|error| {
                MemoryError::storage(format!("failed to prepare recent chats query: {error}"))
            })?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = statement
            .query_map(params![limit], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(|error| {
                MemoryError::storage(format!("failed to query recent chats: {error}"))
            })?;

        let mut summaries = Vec::new();
        for row in rows {
            let (id, title, model, created_at) = row.map_err(|error| {
                MemoryError::storage(format!("failed to decode recent chat row: {error}"))
            })?;
            summaries.push(ChatSummary {
                id: ChatId::from(id),
                title,
                model,
                created_at: decode_timestamp(&created_at)?,
            });
        }

        Ok(summaries)
    }

    fn delete(&self, id: &ChatId) -> Result<bool, MemoryError> {
        let conn = self.connection()?;
        let removed = conn
            .execute("DELETE FROM chats WHERE id = ?1", params![id.as_str()])
            .map_err(|error| MemoryError::storage(format!("failed to delete chat: {error}")))?;
        Ok(removed > 0)
    }

    fn clear_older_than(&self, days: u32) -> Result<usize, MemoryError> {
        let cutoff = retention_cutoff(Utc::now(), days)
            .and_time(NaiveTime::MIN)
            .and_utc();

        let conn = self.connection()?;
        let removed = conn
            .execute(
                "DELETE FROM chats WHERE created_at < ?1",
                params![encode_timestamp(cutoff)],
            )
            .map_err(|error| {
                MemoryError::storage(format!("failed to clear old chats: {error}"))
            })?;
        debug!(removed, days, "old chats cleared");

        Ok(removed)
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn save_chat<'a>(&'a self, chat: StoredChat) -> BoxFuture<'a, Result<(), ChatError>> {
        Box::pin(async move { Ok(self.save(&chat)?) })
    }

    fn get_chat<'a>(
        &'a self,
        id: &'a ChatId,
    ) -> BoxFuture<'a, Result<Option<StoredChat>, ChatError>> {
        Box::pin(async move { Ok(self.load(id)?) })
    }

    fn get_recent_chats<'a>(
        &'a self,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<ChatSummary>, ChatError>> {
        Box::pin(async move { Ok(self.recent(limit)?) })
    }

    fn delete_chat<'a>(&'a self, id: &'a ChatId) -> BoxFuture<'a, Result<bool, ChatError>> {
        Box::pin(async move { Ok(self.delete(id)?) })
    }

    fn clear_old_chats<'a>(&'a self, days: u32) -> BoxFuture<'a, Result<usize, ChatError>> {
        Box::pin(async move { Ok(self.clear_older_than(days)?) })
    }
}

/// Fixed-width UTC text, so lexical order in SQL matches time order.
fn encode_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_timestamp(value: &str) -> Result<DateTime<Utc>, MemoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| {
            MemoryError::storage(format!("invalid stored timestamp '{value}': {error}"))
        })
}

pub(crate) fn default_sqlite_path(root: &Path) -> PathBuf {
    root.join("history.sqlite3")
}
