//! Local Ollama backend over the transport trait.

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;

use crate::{
    BackendKind, ChatRequest, FragmentStream, ModelBackend, ModelInfo, ProviderError,
    ProviderFuture,
};

use super::transport::OllamaTransport;
use super::types::{OllamaChatRequest, OllamaMessage, OllamaOptions, OllamaShowRequest};

#[derive(Clone)]
pub struct OllamaBackend {
    transport: Arc<dyn OllamaTransport>,
}

impl OllamaBackend {
    pub fn new(transport: Arc<dyn OllamaTransport>) -> Self {
        Self { transport }
    }

    pub(crate) fn build_request(request: ChatRequest) -> OllamaChatRequest {
        OllamaChatRequest {
            model: request.model,
            messages: request
                .messages
                .into_iter()
                .map(OllamaMessage::from)
                .collect(),
            stream: true,
            options: OllamaOptions {
                num_ctx: request.options.num_ctx,
            },
        }
    }
}

impl ModelBackend for OllamaBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Ollama
    }

    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>> {
        Box::pin(async move {
            let tags = self.transport.tags().await?;
            Ok(tags
                .models
                .iter()
                .filter_map(|tag| tag.id().map(str::to_string))
                .collect())
        })
    }

    fn show<'a>(&'a self, model: &'a str) -> ProviderFuture<'a, Result<ModelInfo, ProviderError>> {
        Box::pin(async move {
            let response = self
                .transport
                .show(OllamaShowRequest {
                    model: model.to_string(),
                })
                .await?;

            let context_length = response.context_length().ok_or_else(|| {
                ProviderError::not_found(format!(
                    "model '{model}' does not report a family context length"
                ))
            })?;

            Ok(ModelInfo::new(model, context_length))
        })
    }

    fn chat<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<FragmentStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let mut chunks = self.transport.chat(Self::build_request(request)).await?;

            let stream = try_stream! {
                while let Some(chunk) = chunks.next().await {
                    let chunk = chunk?;
                    if let Some(error) = chunk.error {
                        Err(ProviderError::transport(error))?;
                    }

                    if let Some(message) = chunk.message
                        && !message.content.is_empty()
                    {
                        yield message.content;
                    }

                    if chunk.done {
                        break;
                    }
                }
            };

            Ok(Box::pin(stream) as FragmentStream<'a>)
        })
    }
}
