//! Common imports for most rapport applications.

pub use crate::{
    GatewayConfig, assistant_message, build_backends, build_gateway, build_gateway_with_hooks,
    build_runtime, build_runtime_with, build_runtime_with_context, default_hooks, file_message,
    system_message, user_message,
};
pub use crate::{rp_messages, rp_msg};
pub use crate::{
    BackendKind, ChatContext, ChatContextConfig, ChatError, ChatErrorKind, ChatGateway, ChatId,
    ChatMessage, ChatSummary, GenerationState, HistoryBackendConfig, HistoryStore, Message,
    ModelBackend, PromptOutcome, ProviderError, ProviderErrorKind, Role,
};
