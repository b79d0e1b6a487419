//! Chat gateway dispatching to the backend bound to each model.
//!
//! Output is normalized to [`ChatChunk`] values regardless of the backend's
//! wire format. Unknown models are rejected before any upstream call.

use std::sync::Arc;
use std::time::Instant;

use async_stream::try_stream;
use futures_util::StreamExt;

use crate::{
    ChatChunk, ChatChunkStream, ChatOptions, ChatRequest, GatewayHooks, Message, ModelBackend,
    ModelDirectory, ModelInfo, NoopGatewayHooks, ProviderError, ProviderFuture,
};

pub struct ChatGateway {
    directory: ModelDirectory,
    hooks: Arc<dyn GatewayHooks>,
}

impl ChatGateway {
    pub fn new(directory: ModelDirectory) -> Self {
        Self {
            directory,
            hooks: Arc::new(NoopGatewayHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn GatewayHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Enumerates `backends` and builds a gateway over the resulting directory.
    pub async fn discover(
        backends: Vec<Arc<dyn ModelBackend>>,
        hooks: Arc<dyn GatewayHooks>,
    ) -> Result<Self, ProviderError> {
        let directory = ModelDirectory::discover_with_hooks(backends, hooks.as_ref()).await?;
        Ok(Self { directory, hooks })
    }

    pub fn directory(&self) -> &ModelDirectory {
        &self.directory
    }

    pub fn list(&self) -> Vec<String> {
        self.directory.list()
    }

    pub fn show<'a>(
        &'a self,
        model: &'a str,
    ) -> ProviderFuture<'a, Result<ModelInfo, ProviderError>> {
        Box::pin(async move {
            let backend = self.directory.backend_for(model)?;
            let kind = backend.kind();

            self.hooks.on_request_start(kind, "show", model);
            let started = Instant::now();
            let info = backend
                .show(model)
                .await
                .inspect_err(|error| self.hooks.on_failure(kind, "show", model, error))?;
            self.hooks.on_success(kind, "show", model, started.elapsed());

            Ok(info)
        })
    }

    pub fn chat<'a>(
        &'a self,
        model: &str,
        messages: Vec<Message>,
        options: ChatOptions,
    ) -> ProviderFuture<'a, Result<ChatChunkStream<'a>, ProviderError>> {
        let model = model.to_string();
        Box::pin(async move {
            let backend = self.directory.backend_for(&model)?;
            let kind = backend.kind();
            let hooks = Arc::clone(&self.hooks);

            hooks.on_request_start(kind, "chat", &model);
            let started = Instant::now();
            let request = ChatRequest::new(model.clone(), messages).with_options(options);
            let mut fragments = backend
                .chat(request)
                .await
                .inspect_err(|error| hooks.on_failure(kind, "chat", &model, error))?;

            let stream = try_stream! {
                let mut count = 0_u64;
                while let Some(item) = fragments.next().await {
                    let fragment =
                        item.inspect_err(|error| hooks.on_failure(kind, "chat", &model, error))?;
                    count += 1;
                    yield ChatChunk::new(fragment);
                }

                hooks.on_stream_complete(kind, &model, count, started.elapsed());
            };

            Ok(Box::pin(stream) as ChatChunkStream<'a>)
        })
    }
}

impl std::fmt::Debug for ChatGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatGateway")
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}
