//! Operational hook contract invoked around gateway operations.

use std::time::Duration;

use crate::{BackendKind, ProviderError};

pub trait GatewayHooks: Send + Sync {
    fn on_request_start(&self, _backend: BackendKind, _operation: &str, _model: &str) {}

    fn on_success(&self, _backend: BackendKind, _operation: &str, _model: &str, _elapsed: Duration) {
    }

    fn on_stream_complete(
        &self,
        _backend: BackendKind,
        _model: &str,
        _fragments: u64,
        _elapsed: Duration,
    ) {
    }

    fn on_failure(
        &self,
        _backend: BackendKind,
        _operation: &str,
        _model: &str,
        _error: &ProviderError,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGatewayHooks;

impl GatewayHooks for NoopGatewayHooks {}
