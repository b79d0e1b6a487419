//! Ollama transport trait and reqwest-based HTTP implementation.

use std::pin::Pin;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{Client, Response};

use crate::adapters::http::{classify_status, decode_line, drain_lines, map_reqwest_error};
use crate::{ProviderError, ProviderFuture};

use super::types::{
    OllamaChatChunk, OllamaChatRequest, OllamaShowRequest, OllamaShowResponse, OllamaTagsResponse,
};

pub const OLLAMA_HOST_URL: &str = "http://localhost:11434";

pub type OllamaChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<OllamaChatChunk, ProviderError>> + Send + 'a>>;

pub trait OllamaTransport: Send + Sync + std::fmt::Debug {
    fn tags<'a>(&'a self) -> ProviderFuture<'a, Result<OllamaTagsResponse, ProviderError>>;

    fn show<'a>(
        &'a self,
        request: OllamaShowRequest,
    ) -> ProviderFuture<'a, Result<OllamaShowResponse, ProviderError>>;

    fn chat<'a>(
        &'a self,
        request: OllamaChatRequest,
    ) -> ProviderFuture<'a, Result<OllamaChunkStream<'a>, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct OllamaHttpTransport {
    client: Client,
    host: String,
}

impl OllamaHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            host: OLLAMA_HOST_URL.to_string(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.host.trim_end_matches('/'), path)
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| value.get("error")?.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("Ollama request failed with status {status}"));

        classify_status(status, message)
    }
}

impl OllamaTransport for OllamaHttpTransport {
    fn tags<'a>(&'a self) -> ProviderFuture<'a, Result<OllamaTagsResponse, ProviderError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(self.endpoint("api/tags"))
                .send()
                .await
                .map_err(map_reqwest_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            response
                .json::<OllamaTagsResponse>()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))
        })
    }

    fn show<'a>(
        &'a self,
        request: OllamaShowRequest,
    ) -> ProviderFuture<'a, Result<OllamaShowResponse, ProviderError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.endpoint("api/show"))
                .json(&request)
                .send()
                .await
                .map_err(map_reqwest_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            response
                .json::<OllamaShowResponse>()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))
        })
    }

    fn chat<'a>(
        &'a self,
        mut request: OllamaChatRequest,
    ) -> ProviderFuture<'a, Result<OllamaChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.stream = true;
            let response = self
                .client
                .post(self.endpoint("api/chat"))
                .json(&request)
                .send()
                .await
                .map_err(map_reqwest_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let stream = try_stream! {
                let mut bytes_stream = response.bytes_stream();
                let mut buffer = Vec::new();
                let mut done = false;

                while let Some(item) = bytes_stream.next().await {
                    let bytes = item.map_err(map_reqwest_error)?;
                    buffer.extend_from_slice(&bytes);

                    for line in drain_lines(&mut buffer)? {
                        let chunk: OllamaChatChunk = serde_json::from_str(&line)
                            .map_err(|err| ProviderError::transport(err.to_string()))?;
                        done = chunk.done;
                        yield chunk;

                        if done {
                            break;
                        }
                    }

                    if done {
                        break;
                    }
                }

                let tail = decode_line(&buffer)?;
                if !done && !tail.is_empty() {
                    let chunk: OllamaChatChunk = serde_json::from_str(&tail)
                        .map_err(|err| ProviderError::transport(err.to_string()))?;
                    yield chunk;
                }
            };

            Ok(Box::pin(stream) as OllamaChunkStream<'a>)
        })
    }
}
