//! Backend and gateway construction from [`GatewayConfig`].

use std::sync::Arc;

use robserve::{FanoutGatewayHooks, MetricsGatewayHooks, SafeGatewayHooks, TracingGatewayHooks};
use rprovider::{ChatGateway, GatewayHooks, ModelBackend, ProviderError};
use tracing::{debug, info};

use crate::GatewayConfig;

/// Tracing and metrics hooks, each isolated from panics.
pub fn default_hooks() -> Arc<dyn GatewayHooks> {
    Arc::new(
        FanoutGatewayHooks::new()
            .with(Arc::new(SafeGatewayHooks::new(TracingGatewayHooks)))
            .with(Arc::new(SafeGatewayHooks::new(MetricsGatewayHooks))),
    )
}

/// Instantiates the enabled backends without contacting them.
///
/// The hosted backend is included only when the config carries a non-blank
/// key. The key is not validated here; upstream rejects it per request.
pub fn build_backends(config: &GatewayConfig) -> Result<Vec<Arc<dyn ModelBackend>>, ProviderError> {
    let mut backends: Vec<Arc<dyn ModelBackend>> = Vec::new();
    add_ollama_backend(config, &mut backends)?;
    add_anthropic_backend(config, &mut backends)?;
    debug!(backends = backends.len(), "backends configured");

    Ok(backends)
}

pub async fn build_gateway(config: &GatewayConfig) -> Result<ChatGateway, ProviderError> {
    build_gateway_with_hooks(config, default_hooks()).await
}

/// Enumerates every configured backend; any unreachable backend fails the build.
pub async fn build_gateway_with_hooks(
    config: &GatewayConfig,
    hooks: Arc<dyn GatewayHooks>,
) -> Result<ChatGateway, ProviderError> {
    let backends = build_backends(config)?;
    let gateway = ChatGateway::discover(backends, hooks).await?;
    info!(models = gateway.directory().len(), "model directory ready");

    Ok(gateway)
}

/// `config.timeout` bounds connecting and each idle gap between body reads,
/// never the whole response, so long generations keep streaming.
#[cfg(any(feature = "backend-ollama", feature = "backend-anthropic"))]
fn http_client(config: &GatewayConfig) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .connect_timeout(config.timeout)
        .read_timeout(config.timeout)
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))
}

#[cfg(feature = "backend-ollama")]
fn add_ollama_backend(
    config: &GatewayConfig,
    backends: &mut Vec<Arc<dyn ModelBackend>>,
) -> Result<(), ProviderError> {
    use rprovider::adapters::ollama::{OllamaBackend, OllamaHttpTransport};

    let transport =
        OllamaHttpTransport::new(http_client(config)?).with_host(config.ollama_host.clone());
    backends.push(Arc::new(OllamaBackend::new(Arc::new(transport))));
    Ok(())
}

#[cfg(not(feature = "backend-ollama"))]
fn add_ollama_backend(
    _config: &GatewayConfig,
    _backends: &mut Vec<Arc<dyn ModelBackend>>,
) -> Result<(), ProviderError> {
    Ok(())
}

#[cfg(feature = "backend-anthropic")]
fn add_anthropic_backend(
    config: &GatewayConfig,
    backends: &mut Vec<Arc<dyn ModelBackend>>,
) -> Result<(), ProviderError> {
    use rprovider::SecureCredentialManager;
    use rprovider::adapters::anthropic::{AnthropicBackend, AnthropicHttpTransport};

    let Some(api_key) = config
        .anthropic_api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
    else {
        return Ok(());
    };
    let credentials = Arc::new(SecureCredentialManager::new());
    credentials.set_anthropic_api_key(api_key)?;

    let transport = AnthropicHttpTransport::new(http_client(config)?)
        .with_base_url(config.anthropic_base_url.clone());
    backends.push(Arc::new(AnthropicBackend::new(
        credentials,
        Arc::new(transport),
    )));
    Ok(())
}

#[cfg(not(feature = "backend-anthropic"))]
fn add_anthropic_backend(
    config: &GatewayConfig,
    _backends: &mut Vec<Arc<dyn ModelBackend>>,
) -> Result<(), ProviderError> {
    if config.has_anthropic_key() {
        tracing::warn!("anthropic key configured but the backend-anthropic feature is disabled");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(all(feature = "backend-ollama", feature = "backend-anthropic"))]
    #[test]
    fn unconventional_anthropic_keys_still_enable_the_hosted_backend() {
        use rprovider::BackendKind;

        let config = GatewayConfig::new().with_anthropic_api_key("not-a-real-key");

        let backends = build_backends(&config).expect("local backend must survive");

        let kinds = backends.iter().map(|b| b.kind()).collect::<Vec<_>>();
        assert_eq!(kinds, vec![BackendKind::Ollama, BackendKind::Anthropic]);
    }

    #[cfg(all(feature = "backend-ollama", feature = "backend-anthropic"))]
    #[test]
    fn blank_anthropic_key_leaves_only_the_local_backend() {
        use rprovider::BackendKind;

        let config = GatewayConfig::new().with_anthropic_api_key("   ");

        let backends = build_backends(&config).expect("backends should build");

        let kinds = backends.iter().map(|b| b.kind()).collect::<Vec<_>>();
        assert_eq!(kinds, vec![BackendKind::Ollama]);
    }

    #[cfg(all(feature = "backend-ollama", feature = "backend-anthropic"))]
    #[test]
    fn hosted_backend_is_enabled_only_with_a_key() {
        use rprovider::BackendKind;

        let local_only = build_backends(&GatewayConfig::new()).expect("backends should build");
        let kinds = local_only.iter().map(|b| b.kind()).collect::<Vec<_>>();
        assert_eq!(kinds, vec![BackendKind::Ollama]);

        let both = build_backends(&GatewayConfig::new().with_anthropic_api_key("sk-ant-test"))
            .expect("backends should build");
        let kinds = both.iter().map(|b| b.kind()).collect::<Vec<_>>();
        assert_eq!(kinds, vec![BackendKind::Ollama, BackendKind::Anthropic]);
    }

    #[cfg(feature = "backend-ollama")]
    #[tokio::test]
    async fn unreachable_local_backend_fails_gateway_build() {
        use std::time::Duration;

        let config = GatewayConfig::new()
            .with_ollama_host("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(5));

        let error = build_gateway(&config)
            .await
            .expect_err("closed port must fail discovery");

        assert!(error.is_backend_failure());
    }
}
