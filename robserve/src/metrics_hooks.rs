//! Metrics-based gateway hooks.
//!
//! ```rust
//! use robserve::MetricsGatewayHooks;
//! use rprovider::GatewayHooks;
//!
//! fn accepts_gateway_hooks(_hooks: &dyn GatewayHooks) {}
//!
//! let hooks = MetricsGatewayHooks;
//! accepts_gateway_hooks(&hooks);
//! ```

use std::time::Duration;

use rprovider::{BackendKind, GatewayHooks, ProviderError};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsGatewayHooks;

impl GatewayHooks for MetricsGatewayHooks {
    fn on_request_start(&self, backend: BackendKind, operation: &str, _model: &str) {
        metrics::counter!(
            "rapport_gateway_request_start_total",
            "backend" => backend.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_success(&self, backend: BackendKind, operation: &str, _model: &str, elapsed: Duration) {
        metrics::counter!(
            "rapport_gateway_success_total",
            "backend" => backend.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "rapport_gateway_duration_seconds",
            "backend" => backend.to_string(),
            "operation" => operation.to_string(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_stream_complete(
        &self,
        backend: BackendKind,
        model: &str,
        fragments: u64,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "rapport_gateway_stream_complete_total",
            "backend" => backend.to_string(),
            "model" => model.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "rapport_gateway_fragments_per_stream",
            "backend" => backend.to_string()
        )
        .record(fragments as f64);
        metrics::histogram!(
            "rapport_gateway_duration_seconds",
            "backend" => backend.to_string(),
            "operation" => "chat",
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_failure(
        &self,
        backend: BackendKind,
        operation: &str,
        _model: &str,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "rapport_gateway_failure_total",
            "backend" => backend.to_string(),
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }
}
