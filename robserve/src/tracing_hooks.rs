//! Tracing-based gateway hooks.
//!
//! ```rust
//! use robserve::TracingGatewayHooks;
//! use rprovider::GatewayHooks;
//!
//! fn accepts_gateway_hooks(_hooks: &dyn GatewayHooks) {}
//!
//! let hooks = TracingGatewayHooks;
//! accepts_gateway_hooks(&hooks);
//! ```

use std::time::Duration;

use rprovider::{BackendKind, GatewayHooks, ProviderError};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingGatewayHooks;

impl GatewayHooks for TracingGatewayHooks {
    fn on_request_start(&self, backend: BackendKind, operation: &str, model: &str) {
        tracing::debug!(
            phase = "gateway",
            event = "request_start",
            backend = %backend,
            operation,
            model
        );
    }

    fn on_success(&self, backend: BackendKind, operation: &str, model: &str, elapsed: Duration) {
        tracing::info!(
            phase = "gateway",
            event = "success",
            backend = %backend,
            operation,
            model,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_stream_complete(
        &self,
        backend: BackendKind,
        model: &str,
        fragments: u64,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "gateway",
            event = "stream_complete",
            backend = %backend,
            operation = "chat",
            model,
            fragments,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_failure(
        &self,
        backend: BackendKind,
        operation: &str,
        model: &str,
        error: &ProviderError,
    ) {
        tracing::error!(
            phase = "gateway",
            event = "failure",
            backend = %backend,
            operation,
            model,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}
