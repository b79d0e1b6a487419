//! Chat history storage contract and a basic in-memory implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rcommon::{BoxFuture, ChatId};
use serde::{Deserialize, Serialize};

use crate::{ChatError, ChatMessage, ChatSession};

/// One persisted chat: the `save_chat` payload and the `get_chat` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredChat {
    pub id: ChatId,
    pub title: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
}

impl StoredChat {
    pub fn from_session(session: &ChatSession) -> Self {
        Self {
            id: session.id().clone(),
            title: session.title(),
            model: session.model.clone(),
            created_at: session.created_at(),
            messages: session.messages().to_vec(),
        }
    }

    pub fn summary(&self) -> ChatSummary {
        ChatSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            model: self.model.clone(),
            created_at: self.created_at,
        }
    }

    pub fn into_session(self) -> ChatSession {
        ChatSession::restore(self.id, self.model, self.messages, self.created_at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: ChatId,
    pub title: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

pub trait HistoryStore: Send + Sync {
    /// Inserts or replaces the chat stored under `chat.id`.
    fn save_chat<'a>(&'a self, chat: StoredChat) -> BoxFuture<'a, Result<(), ChatError>>;

    fn get_chat<'a>(
        &'a self,
        id: &'a ChatId,
    ) -> BoxFuture<'a, Result<Option<StoredChat>, ChatError>>;

    /// Most recent first, at most `limit` entries.
    fn get_recent_chats<'a>(
        &'a self,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<ChatSummary>, ChatError>>;

    fn delete_chat<'a>(&'a self, id: &'a ChatId) -> BoxFuture<'a, Result<bool, ChatError>>;

    /// Deletes chats created on a day before `today - days`; returns the count.
    fn clear_old_chats<'a>(&'a self, days: u32) -> BoxFuture<'a, Result<usize, ChatError>>;
}

/// Chats created on a date strictly before the returned date are old.
pub fn retention_cutoff(now: DateTime<Utc>, days: u32) -> NaiveDate {
    let today = now.date_naive();
    today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Sorts newest first, breaking timestamp ties by id, and truncates.
pub fn sort_recent(mut summaries: Vec<ChatSummary>, limit: usize) -> Vec<ChatSummary> {
    summaries.sort_by(|left, right| {
        right
            .created_at
            .cmp(&left.created_at)
            .then_with(|| right.id.cmp(&left.id))
    });
    summaries.truncate(limit);
    summaries
}

#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    chats: Mutex<HashMap<ChatId, StoredChat>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn chats(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<ChatId, StoredChat>>, ChatError> {
        self.chats
            .lock()
            .map_err(|_| ChatError::store("history store lock poisoned"))
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn save_chat<'a>(&'a self, chat: StoredChat) -> BoxFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            self.chats()?.insert(chat.id.clone(), chat);
            Ok(())
        })
    }

    fn get_chat<'a>(
        &'a self,
        id: &'a ChatId,
    ) -> BoxFuture<'a, Result<Option<StoredChat>, ChatError>> {
        Box::pin(async move { Ok(self.chats()?.get(id).cloned()) })
    }

    fn get_recent_chats<'a>(
        &'a self,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<ChatSummary>, ChatError>> {
        Box::pin(async move {
            let summaries = self
                .chats()?
                .values()
                .map(StoredChat::summary)
                .collect::<Vec<_>>();
            Ok(sort_recent(summaries, limit))
        })
    }

    fn delete_chat<'a>(&'a self, id: &'a ChatId) -> BoxFuture<'a, Result<bool, ChatError>> {
        Box::pin(async move { Ok(self.chats()?.remove(id).is_some()) })
    }

    fn clear_old_chats<'a>(&'a self, days: u32) -> BoxFuture<'a, Result<usize, ChatError>> {
        Box::pin(async move {
            let cutoff = retention_cutoff(Utc::now(), days);
            let mut chats = self.chats()?;
            let before = chats.len();
            chats.retain(|_, chat| chat.created_at.date_naive() >= cutoff);
            Ok(before - chats.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn stored(id: &str, created_at: DateTime<Utc>) -> StoredChat {
        StoredChat {
            id: ChatId::from(id),
            title: format!("chat {id}"),
            model: "llama3:latest".to_string(),
            created_at,
            messages: vec![ChatMessage::user("Hi"), ChatMessage::assistant("Hello")],
        }
    }

    #[test]
    fn retention_cutoff_counts_whole_days() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();

        assert_eq!(
            retention_cutoff(now, 7),
            NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
        );
        assert_eq!(retention_cutoff(now, 0), now.date_naive());
    }

    #[tokio::test]
    async fn in_memory_store_saves_replaces_and_lists_recent_first() {
        let store = InMemoryHistoryStore::new();
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();

        store.save_chat(stored("a", base)).await.expect("save a");
        store
            .save_chat(stored("b", base + Duration::minutes(5)))
            .await
            .expect("save b");
        store
            .save_chat(stored("c", base + Duration::minutes(10)))
            .await
            .expect("save c");

        let mut updated = stored("a", base);
        updated.title = "renamed".to_string();
        store.save_chat(updated).await.expect("replace a");

        let recent = store.get_recent_chats(2).await.expect("recent");
        let ids = recent.iter().map(|s| s.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["c", "b"]);

        let loaded = store
            .get_chat(&ChatId::from("a"))
            .await
            .expect("get")
            .expect("chat a should exist");
        assert_eq!(loaded.title, "renamed");
        assert!(store
            .get_chat(&ChatId::from("missing"))
            .await
            .expect("get")
            .is_none());
    }

    #[tokio::test]
    async fn in_memory_store_deletes_and_clears_old_chats() {
        let store = InMemoryHistoryStore::new();
        let now = Utc::now();

        store
            .save_chat(stored("old", now - Duration::days(30)))
            .await
            .expect("save old");
        store.save_chat(stored("new", now)).await.expect("save new");

        assert_eq!(store.clear_old_chats(7).await.expect("clear"), 1);
        assert!(store.delete_chat(&ChatId::from("new")).await.expect("delete"));
        assert!(!store.delete_chat(&ChatId::from("new")).await.expect("delete"));
        assert!(store.get_recent_chats(5).await.expect("recent").is_empty());
    }
}
