//! Unified facade over the rapport workspace crates.
//!
//! This crate is the single dependency for most applications. It re-exports
//! the workspace crates and wires configuration into a ready chat context.
//!
//! ```rust,no_run
//! use rapport::{GatewayConfig, HistoryBackendConfig, build_runtime};
//!
//! # async fn run() -> Result<(), rapport::ChatError> {
//! let mut context = build_runtime(&GatewayConfig::from_env(), HistoryBackendConfig::default()).await?;
//! context.submit("Explain ownership in one sentence.")?;
//! let reply = context.begin_generation(|fragment| print!("{fragment}")).await?;
//! assert!(!reply.is_empty());
//! # Ok(())
//! # }
//! ```

mod backends;
mod config;
mod macros;

pub mod prelude;
pub mod runtime;
pub mod util;

pub use rchat;
pub use rcommon;
pub use rmemory;
pub use robserve;
pub use rprovider;

pub use rchat::{
    Attachment, AttachmentError, AttachmentErrorKind, ChatContext, ChatContextConfig, ChatError,
    ChatErrorKind, ChatMessage, ChatSession, ChatSummary, GenerationState, HistoryStore,
    InMemoryHistoryStore, IncludeCommand, PromptOutcome, StoredChat, compose,
};
pub use rcommon::{BoxFuture, ChatId};
pub use rmemory::{
    FilesystemHistoryStore, HistoryBackendConfig, MemoryError, MemoryErrorKind,
    SqliteHistoryStore, create_history_store,
};
pub use robserve::{
    FanoutGatewayHooks, MetricsGatewayHooks, SafeGatewayHooks, TracingGatewayHooks,
};
pub use rprovider::{
    BackendKind, ChatChunk, ChatChunkStream, ChatGateway, ChatOptions, GatewayHooks, Message,
    ModelBackend, ModelDirectory, ModelInfo, NoopGatewayHooks, ProviderError, ProviderErrorKind,
    ProviderFuture, Role,
};

pub use backends::{build_backends, build_gateway, build_gateway_with_hooks, default_hooks};
pub use config::{
    ANTHROPIC_API_KEY_ENV, DEFAULT_ANTHROPIC_BASE_URL, DEFAULT_OLLAMA_HOST, DEFAULT_TIMEOUT,
    GatewayConfig, OLLAMA_HOST_ENV,
};
pub use runtime::{build_runtime, build_runtime_with, build_runtime_with_context};
pub use util::{assistant_message, file_message, system_message, user_message};
