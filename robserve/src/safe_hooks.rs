use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use rprovider::{BackendKind, GatewayHooks, ProviderError};

/// Contains panics raised by the wrapped hooks.
pub struct SafeGatewayHooks<H> {
    inner: H,
}

impl<H> SafeGatewayHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> GatewayHooks for SafeGatewayHooks<H>
where
    H: GatewayHooks,
{
    fn on_request_start(&self, backend: BackendKind, operation: &str, model: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_request_start(backend, operation, model)
        }));
    }

    fn on_success(&self, backend: BackendKind, operation: &str, model: &str, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(backend, operation, model, elapsed)
        }));
    }

    fn on_stream_complete(
        &self,
        backend: BackendKind,
        model: &str,
        fragments: u64,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_stream_complete(backend, model, fragments, elapsed)
        }));
    }

    fn on_failure(
        &self,
        backend: BackendKind,
        operation: &str,
        model: &str,
        error: &ProviderError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_failure(backend, operation, model, error)
        }));
    }
}

/// Dispatches every event to each registered hook, in registration order.
#[derive(Default, Clone)]
pub struct FanoutGatewayHooks {
    hooks: Vec<Arc<dyn GatewayHooks>>,
}

impl FanoutGatewayHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hooks: Arc<dyn GatewayHooks>) -> Self {
        self.hooks.push(hooks);
        self
    }

    pub fn push(&mut self, hooks: Arc<dyn GatewayHooks>) {
        self.hooks.push(hooks);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl GatewayHooks for FanoutGatewayHooks {
    fn on_request_start(&self, backend: BackendKind, operation: &str, model: &str) {
        for hooks in &self.hooks {
            hooks.on_request_start(backend, operation, model);
        }
    }

    fn on_success(&self, backend: BackendKind, operation: &str, model: &str, elapsed: Duration) {
        for hooks in &self.hooks {
            hooks.on_success(backend, operation, model, elapsed);
        }
    }

    fn on_stream_complete(
        &self,
        backend: BackendKind,
        model: &str,
        fragments: u64,
        elapsed: Duration,
    ) {
        for hooks in &self.hooks {
            hooks.on_stream_complete(backend, model, fragments, elapsed);
        }
    }

    fn on_failure(
        &self,
        backend: BackendKind,
        operation: &str,
        model: &str,
        error: &ProviderError,
    ) {
        for hooks in &self.hooks {
            hooks.on_failure(backend, operation, model, error);
        }
    }
}
