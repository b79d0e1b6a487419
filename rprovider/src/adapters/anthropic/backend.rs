//! Hosted Anthropic backend with a fixed model catalog.

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;

use crate::{
    BackendKind, ChatRequest, FragmentStream, ModelBackend, ModelInfo, ProviderError,
    ProviderFuture, SecureCredentialManager,
};

use super::auth::resolve_anthropic_key;
use super::transport::AnthropicTransport;
use super::types::{AnthropicDelta, AnthropicRequest, AnthropicStreamEvent};

pub const ANTHROPIC_MODELS: [&str; 2] = ["claude-3-5-haiku-latest", "claude-3-5-sonnet-latest"];
pub const ANTHROPIC_CONTEXT_LENGTH: u32 = 200_000;

#[derive(Clone)]
pub struct AnthropicBackend {
    credentials: Arc<SecureCredentialManager>,
    transport: Arc<dyn AnthropicTransport>,
    models: Vec<String>,
}

impl AnthropicBackend {
    pub fn new(
        credentials: Arc<SecureCredentialManager>,
        transport: Arc<dyn AnthropicTransport>,
    ) -> Self {
        Self {
            credentials,
            transport,
            models: ANTHROPIC_MODELS.iter().map(|model| model.to_string()).collect(),
        }
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }

    fn serves(&self, model: &str) -> bool {
        self.models.iter().any(|candidate| candidate == model)
    }
}

impl ModelBackend for AnthropicBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Anthropic
    }

    /// Empty without a stored API key, so hosted models never reach the
    /// directory unless they can be called.
    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>> {
        Box::pin(async move {
            if !self.credentials.has_credentials(BackendKind::Anthropic)? {
                return Ok(Vec::new());
            }

            Ok(self.models.clone())
        })
    }

    fn show<'a>(&'a self, model: &'a str) -> ProviderFuture<'a, Result<ModelInfo, ProviderError>> {
        Box::pin(async move {
            if !self.serves(model) {
                return Err(ProviderError::unknown_model(model));
            }

            Ok(ModelInfo::new(model, ANTHROPIC_CONTEXT_LENGTH))
        })
    }

    fn chat<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<FragmentStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            if !self.serves(&request.model) {
                return Err(ProviderError::unknown_model(&request.model));
            }

            let api_key = resolve_anthropic_key(&self.credentials)?;
            let upstream = AnthropicRequest::from_messages(request.model, request.messages);
            let mut events = self.transport.stream(upstream, api_key).await?;

            let stream = try_stream! {
                while let Some(event) = events.next().await {
                    match event? {
                        AnthropicStreamEvent::ContentBlockDelta {
                            delta: AnthropicDelta::TextDelta { text },
                        } => {
                            yield text;
                        }
                        AnthropicStreamEvent::Error { error } => {
                            Err(ProviderError::from(error))?;
                        }
                        AnthropicStreamEvent::MessageStop {} => break,
                        _ => {}
                    }
                }
            };

            Ok(Box::pin(stream) as FragmentStream<'a>)
        })
    }
}
