//! Runtime wiring: gateway, history store, and chat context.

use std::sync::Arc;

use rchat::{ChatContext, ChatContextConfig, ChatError, HistoryStore};
use rmemory::{HistoryBackendConfig, create_history_store};
use rprovider::ChatGateway;

use crate::{GatewayConfig, build_gateway};

pub async fn build_runtime(
    config: &GatewayConfig,
    history: HistoryBackendConfig,
) -> Result<ChatContext, ChatError> {
    build_runtime_with_context(config, history, ChatContextConfig::default()).await
}

pub async fn build_runtime_with_context(
    config: &GatewayConfig,
    history: HistoryBackendConfig,
    context: ChatContextConfig,
) -> Result<ChatContext, ChatError> {
    let store = create_history_store(history)?;
    let gateway = Arc::new(build_gateway(config).await?);
    build_runtime_with(gateway, store, context).await
}

/// Starts a chat context over an already-built gateway and store.
pub async fn build_runtime_with(
    gateway: Arc<ChatGateway>,
    store: Arc<dyn HistoryStore>,
    context: ChatContextConfig,
) -> Result<ChatContext, ChatError> {
    ChatContext::start(gateway, store, context).await
}
