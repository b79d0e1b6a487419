//! Anthropic transport trait and reqwest-based SSE implementation.

use std::pin::Pin;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{Client, Response};

use crate::adapters::http::{classify_status, drain_lines, map_reqwest_error};
use crate::{ProviderError, ProviderFuture, SecretString};

use super::types::{AnthropicErrorEnvelope, AnthropicRequest, AnthropicStreamEvent};

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

pub type AnthropicEventStream<'a> =
    Pin<Box<dyn Stream<Item = Result<AnthropicStreamEvent, ProviderError>> + Send + 'a>>;

pub trait AnthropicTransport: Send + Sync + std::fmt::Debug {
    fn stream<'a>(
        &'a self,
        request: AnthropicRequest,
        api_key: SecretString,
    ) -> ProviderFuture<'a, Result<AnthropicEventStream<'a>, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct AnthropicHttpTransport {
    client: Client,
    base_url: String,
}

impl AnthropicHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: ANTHROPIC_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<AnthropicErrorEnvelope>(&body)
            .ok()
            .map(|envelope| envelope.error.message)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| format!("Anthropic request failed with status {status}"));

        classify_status(status, message)
    }
}

impl AnthropicTransport for AnthropicHttpTransport {
    fn stream<'a>(
        &'a self,
        mut request: AnthropicRequest,
        api_key: SecretString,
    ) -> ProviderFuture<'a, Result<AnthropicEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.stream = true;
            let response = self
                .client
                .post(self.endpoint("v1/messages"))
                .header("x-api-key", api_key.expose())
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&request)
                .send()
                .await
                .map_err(map_reqwest_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let stream = try_stream! {
                let mut chunks = response.bytes_stream();
                let mut sse_buffer = Vec::new();
                let mut finished = false;

                while let Some(item) = chunks.next().await {
                    let bytes = item.map_err(map_reqwest_error)?;
                    sse_buffer.extend_from_slice(&bytes);

                    for line in drain_lines(&mut sse_buffer)? {
                        if !line.starts_with("data:") {
                            continue;
                        }

                        let payload = line.trim_start_matches("data:").trim();
                        let event: AnthropicStreamEvent = serde_json::from_str(payload)
                            .map_err(|err| ProviderError::transport(err.to_string()))?;
                        finished = matches!(event, AnthropicStreamEvent::MessageStop {});
                        yield event;

                        if finished {
                            break;
                        }
                    }

                    if finished {
                        break;
                    }
                }
            };

            Ok(Box::pin(stream) as AnthropicEventStream<'a>)
        })
    }
}
