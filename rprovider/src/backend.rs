use crate::{BackendKind, ChatRequest, FragmentStream, ModelInfo, ProviderError};

pub type ProviderFuture<'a, T> = rcommon::BoxFuture<'a, T>;

/// One upstream system able to enumerate, describe, and stream from models.
pub trait ModelBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Model names served by this backend, in backend-reported order.
    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>>;

    fn show<'a>(&'a self, model: &'a str) -> ProviderFuture<'a, Result<ModelInfo, ProviderError>>;

    /// Opens exactly one upstream streaming request.
    fn chat<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<FragmentStream<'a>, ProviderError>>;
}
