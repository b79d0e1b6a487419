//! Chat sessions, message composition, and history contracts.

pub mod attachment;
mod composer;
mod context;
mod error;
mod session;
mod store;
mod types;

pub mod prelude {
    pub use crate::{
        ChatContext, ChatContextConfig, ChatError, ChatErrorKind, ChatMessage, ChatSession,
        ChatSummary, GenerationState, HistoryStore, InMemoryHistoryStore, PromptOutcome,
        StoredChat, compose,
    };
    pub use rcommon::ChatId;
}

pub use attachment::{
    Attachment, AttachmentError, AttachmentErrorKind, IncludeCommand, read_attachment,
};
pub use composer::{compose, extract_attachment, render_attachment};
pub use context::{
    ChatContext, ChatContextConfig, DEFAULT_MAX_NUM_CTX, DEFAULT_RECENT_CHATS_LIMIT, PromptOutcome,
};
pub use error::{ChatError, ChatErrorKind};
pub use rcommon::ChatId;
pub use session::{ChatSession, GenerationState, UNTITLED_CHAT};
pub use store::{
    ChatSummary, HistoryStore, InMemoryHistoryStore, StoredChat, retention_cutoff, sort_recent,
};
pub use types::ChatMessage;
