//! JSON-file history store.
//!
//! Layout under the root directory:
//!
//! - `chats/<id>.json`: one pretty-printed [`StoredChat`] per chat
//! - `chat_index.json`: `{ "<id>": { "title", "created_at", "model" } }`

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rchat::{ChatError, ChatSummary, HistoryStore, StoredChat, retention_cutoff, sort_recent};
use rcommon::{BoxFuture, ChatId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MemoryError;

const CHATS_DIR: &str = "chats";
const INDEX_FILE: &str = "chat_index.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct IndexEntry {
    title: String,
    created_at: DateTime<Utc>,
    model: String,
}

type ChatIndex = BTreeMap<ChatId, IndexEntry>;

#[derive(Debug)]
pub struct FilesystemHistoryStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl FilesystemHistoryStore {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(CHATS_DIR)).map_err(|error| {
            MemoryError::storage(format!("failed to create history root: {error}"))
        })?;
        Ok(Self {
            root,
            lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>, MemoryError> {
        self.lock
            .lock()
            .map_err(|_| MemoryError::storage("filesystem history lock poisoned"))
    }

    fn chat_path(&self, id: &ChatId) -> Result<PathBuf, MemoryError> {
        validate_chat_id(id)?;
        Ok(self.root.join(CHATS_DIR).join(format!("{id}.json")))
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    fn load_index(&self) -> Result<ChatIndex, MemoryError> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(ChatIndex::new());
        }
        let bytes = fs::read(&path)
            .map_err(|error| MemoryError::storage(format!("failed to read chat index: {error}")))?;
        serde_json::from_slice(&bytes).map_err(|error| {
            MemoryError::storage(format!("failed to deserialize chat index: {error}"))
        })
    }

    fn save_index(&self, index: &ChatIndex) -> Result<(), MemoryError> {
        let bytes = serde_json::to_vec_pretty(index).map_err(|error| {
            MemoryError::storage(format!("failed to serialize chat index: {error}"))
        })?;
        write_atomic(&self.index_path(), &bytes)
    }

    fn save(&self, chat: &StoredChat) -> Result<(), MemoryError> {
        let path = self.chat_path(&chat.id)?;
        let bytes = serde_json::to_vec_pretty(chat)
            .map_err(|error| MemoryError::storage(format!("failed to serialize chat: {error}")))?;

        let _guard = self.guard()?;
        write_atomic(&path, &bytes)?;

        let mut index = self.load_index()?;
        index.insert(
            chat.id.clone(),
            IndexEntry {
                title: chat.title.clone(),
                created_at: chat.created_at,
                model: chat.model.clone(),
            },
        );
        self.save_index(&index)
    }

    fn load(&self, id: &ChatId) -> Result<Option<StoredChat>, MemoryError> {
        let path = self.chat_path(id)?;
        let _guard = self.guard()?;

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(MemoryError::storage(format!(
                    "failed to read chat file: {error}"
                )));
            }
        };
        let chat = serde_json::from_slice(&bytes)
            .map_err(|error| MemoryError::storage(format!("failed to deserialize chat: {error}")))?;
        Ok(Some(chat))
    }

    fn recent(&self, limit: usize) -> Result<Vec<ChatSummary>, MemoryError> {
        let _guard = self.guard()?;
        let summaries = self
            .load_index()?
            .into_iter()
            .map(|(id, entry)| ChatSummary {
                id,
                title: entry.title,
                model: entry.model,
                created_at: entry.created_at,
            })
            .collect();
        Ok(sort_recent(summaries, limit))
    }

    fn delete(&self, id: &ChatId) -> Result<bool, MemoryError> {
        let path = self.chat_path(id)?;
        let _guard = self.guard()?;

        let existed = remove_if_exists(&path)?;
        let mut index = self.load_index()?;
        if index.remove(id).is_some() {
            self.save_index(&index)?;
        }
        Ok(existed)
    }

    fn clear_older_than(&self, days: u32) -> Result<usize, MemoryError> {
        let cutoff = retention_cutoff(Utc::now(), days);
        let _guard = self.guard()?;

        let mut index = self.load_index()?;
        let expired = index
            .iter()
            .filter(|(_, entry)| entry.created_at.date_naive() < cutoff)
            .map(|(id, _)| id.clone())
            .collect::<Vec<_>>();
        if expired.is_empty() {
            return Ok(0);
        }

        for id in &expired {
            remove_if_exists(&self.chat_path(id)?)?;
            index.remove(id);
        }
        self.save_index(&index)?;
        debug!(removed = expired.len(), days, "old chats cleared");

        Ok(expired.len())
    }
}

impl HistoryStore for FilesystemHistoryStore {
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

/// Ids become file names, so only `[A-Za-z0-9_-]` is accepted.
fn validate_chat_id(id: &ChatId) -> Result<(), MemoryError> {
    let value = id.as_str();
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if !valid {
        return Err(MemoryError::invalid_request(format!(
            "chat id '{value}' is not a valid file name"
        )));
    }

    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<bool, MemoryError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(error) => Err(MemoryError::storage(format!(
            "failed to remove chat file: {error}"
        ))),
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), MemoryError> {
    let Some(parent) = path.parent() else {
        return Err(MemoryError::storage("history file missing parent directory"));
    };
    fs::create_dir_all(parent).map_err(|error| {
        MemoryError::storage(format!("failed to create parent directory: {error}"))
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).map_err(|error| {
        MemoryError::storage(format!("failed to write temporary history file: {error}"))
    })?;

    // Windows refuses to rename over an existing file.
    if fs::rename(&tmp, path).is_ok() {
        return Ok(());
    }
    if path.exists() {
        fs::remove_file(path).map_err(|error| {
            MemoryError::storage(format!("failed to replace existing history file: {error}"))
        })?;
    }
    fs::rename(&tmp, path)
        .map_err(|error| MemoryError::storage(format!("failed to finalize history file: {error}")))
}
