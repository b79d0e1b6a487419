//! Common `rprovider` imports for downstream crates.

pub use crate::{
    BackendKind, ChatChunk, ChatChunkStream, ChatGateway, ChatOptions, ChatRequest,
    FragmentStream, GatewayHooks, Message, ModelBackend, ModelDirectory, ModelInfo,
    NoopGatewayHooks, ProviderError, ProviderErrorKind, Role, SecureCredentialManager,
};
pub use rcommon::BoxFuture;
