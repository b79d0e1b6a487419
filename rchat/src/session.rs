//! Chat session entity and generation state.

use chrono::{DateTime, Utc};
use rcommon::ChatId;

use crate::{ChatError, ChatMessage};

const TITLE_WORDS: usize = 10;
pub const UNTITLED_CHAT: &str = "New Chat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    AwaitingGeneration,
    Streaming,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    id: ChatId,
    pub model: String,
    messages: Vec<ChatMessage>,
    created_at: DateTime<Utc>,
}

impl ChatSession {
    /// Fresh session; seeded with `system_prompt` when one is given.
    pub fn new(model: impl Into<String>, system_prompt: Option<&str>) -> Self {
        let created_at = Utc::now();
        Self {
            id: ChatId::from_timestamp(created_at),
            model: model.into(),
            messages: system_prompt
                .map(|prompt| vec![ChatMessage::system(prompt)])
                .unwrap_or_default(),
            created_at,
        }
    }

    pub fn restore(
        id: ChatId,
        model: impl Into<String>,
        messages: Vec<ChatMessage>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            model: model.into(),
            messages,
            created_at,
        }
    }

    pub fn id(&self) -> &ChatId {
        &self.id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn non_system_count(&self) -> usize {
        self.messages.iter().filter(|m| !m.is_system()).count()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Removes the trailing assistant reply; fails for any other last message.
    pub fn remove_last_assistant(&mut self) -> Result<ChatMessage, ChatError> {
        match self.messages.last() {
            Some(message) if message.is_assistant() => self
                .messages
                .pop()
                .ok_or_else(|| ChatError::invalid_state("session has no messages")),
            Some(message) => Err(ChatError::invalid_state(format!(
                "cannot regenerate: last message is '{}', not 'assistant'",
                message.role_name()
            ))),
            None => Err(ChatError::invalid_state(
                "cannot regenerate: session has no messages",
            )),
        }
    }

    /// Appends a streamed fragment to the trailing assistant message.
    pub(crate) fn append_fragment(&mut self, fragment: &str) -> Result<(), ChatError> {
        match self.messages.last_mut() {
            Some(ChatMessage::Assistant { content }) => {
                content.push_str(fragment);
                Ok(())
            }
            _ => Err(ChatError::invalid_state(
                "fragments can only be appended to an assistant message",
            )),
        }
    }

    /// First user message, cut to ten words with `...` when longer.
    pub fn title(&self) -> String {
        let Some(first) = self.messages.iter().find_map(|message| match message {
            ChatMessage::User { content } => Some(content),
            _ => None,
        }) else {
            return UNTITLED_CHAT.to_string();
        };

        let words = first.split_whitespace().collect::<Vec<_>>();
        let mut title = words
            .iter()
            .take(TITLE_WORDS)
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        if words.len() > TITLE_WORDS {
            title.push_str("...");
        }

        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChatErrorKind;

    #[test]
    fn new_session_is_seeded_and_identified_by_timestamp() {
        let session = ChatSession::new("llama3:latest", Some("You are helpful"));

        assert_eq!(session.messages(), &[ChatMessage::system("You are helpful")]);
        assert_eq!(session.id(), &ChatId::from_timestamp(session.created_at()));
        assert_eq!(session.non_system_count(), 0);
        assert!(ChatSession::new("llama3:latest", None).messages().is_empty());
    }

    #[test]
    fn title_keeps_short_messages_and_truncates_long_ones() {
        let mut session = ChatSession::new("m", None);
        assert_eq!(session.title(), "New Chat");

        session.push(ChatMessage::user("one two three four five six seven eight nine"));
        assert_eq!(
            session.title(),
            "one two three four five six seven eight nine"
        );

        let mut long = ChatSession::new("m", None);
        long.push(ChatMessage::assistant("ignored"));
        long.push(ChatMessage::user(
            "one  two three four five six seven eight nine ten eleven",
        ));
        assert_eq!(
            long.title(),
            "one two three four five six seven eight nine ten..."
        );
    }

    #[test]
    fn title_of_exactly_ten_words_has_no_ellipsis() {
        let mut session = ChatSession::new("m", None);
        session.push(ChatMessage::user("a b c d e f g h i j"));

        assert_eq!(session.title(), "a b c d e f g h i j");
    }

    #[test]
    fn remove_last_assistant_requires_trailing_assistant() {
        let mut session = ChatSession::new("m", Some("sys"));
        let error = session
            .remove_last_assistant()
            .expect_err("system message is not removable");
        assert_eq!(error.kind, ChatErrorKind::InvalidState);

        session.push(ChatMessage::user("Hi"));
        session.push(ChatMessage::assistant("Hello"));
        let removed = session
            .remove_last_assistant()
            .expect("assistant reply should be removed");

        assert_eq!(removed, ChatMessage::assistant("Hello"));
        assert_eq!(session.last(), Some(&ChatMessage::user("Hi")));
    }

    #[test]
    fn fragments_append_only_to_assistant_messages() {
        let mut session = ChatSession::new("m", None);
        session.push(ChatMessage::user("Hi"));
        assert!(session.append_fragment("x").is_err());

        session.push(ChatMessage::assistant(""));
        session.append_fragment("Hel").expect("append");
        session.append_fragment("lo").expect("append");

        assert_eq!(session.last(), Some(&ChatMessage::assistant("Hello")));
    }
}
