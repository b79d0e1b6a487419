mod auth;
mod backend;
mod transport;
mod types;

pub use backend::{ANTHROPIC_CONTEXT_LENGTH, ANTHROPIC_MODELS, AnthropicBackend};
pub use transport::{
    ANTHROPIC_BASE_URL, ANTHROPIC_VERSION, AnthropicEventStream, AnthropicHttpTransport,
    AnthropicTransport,
};
pub use types::{
    ANTHROPIC_MAX_TOKENS, AnthropicDelta, AnthropicErrorBody, AnthropicMessage, AnthropicRequest,
    AnthropicStreamEvent,
};
