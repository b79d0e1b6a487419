//! Model directory built once from backend enumeration.
//!
//! Every listed model name is bound to exactly one backend. Local backends
//! are enumerated first so their models lead the listing.

use std::sync::Arc;
use std::time::Instant;

use rcommon::Registry;

use crate::{BackendKind, GatewayHooks, ModelBackend, ModelInfo, NoopGatewayHooks, ProviderError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    pub name: String,
    pub backend: BackendKind,
}

#[derive(Default)]
pub struct ModelDirectory {
    backends: Registry<BackendKind, Arc<dyn ModelBackend>>,
    entries: Vec<ModelEntry>,
    bindings: Registry<String, BackendKind>,
}

impl ModelDirectory {
    pub async fn discover(backends: Vec<Arc<dyn ModelBackend>>) -> Result<Self, ProviderError> {
        Self::discover_with_hooks(backends, &NoopGatewayHooks).await
    }

    pub async fn discover_with_hooks(
        mut backends: Vec<Arc<dyn ModelBackend>>,
        hooks: &dyn GatewayHooks,
    ) -> Result<Self, ProviderError> {
        backends.sort_by_key(|backend| backend.kind());

        let mut directory = Self::default();
        for backend in backends {
            let kind = backend.kind();
            if directory.backends.contains_key(&kind) {
                return Err(ProviderError::invalid_request(format!(
                    "backend '{kind}' registered more than once"
                )));
            }

            hooks.on_request_start(kind, "list", "*");
            let started = Instant::now();
            let models = backend
                .list_models()
                .await
                .inspect_err(|error| hooks.on_failure(kind, "list", "*", error))?;
            hooks.on_success(kind, "list", "*", started.elapsed());

            for name in models {
                directory.bind(name, kind)?;
            }
            directory.backends.insert(kind, backend);
        }

        Ok(directory)
    }

    fn bind(&mut self, name: String, backend: BackendKind) -> Result<(), ProviderError> {
        if let Some(existing) = self.bindings.get(name.as_str()) {
            return Err(ProviderError::invalid_request(format!(
                "model '{name}' is served by both '{existing}' and '{backend}'"
            )));
        }

        self.bindings.insert(name.clone(), backend);
        self.entries.push(ModelEntry { name, backend });
        Ok(())
    }

    pub fn list(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    pub fn contains(&self, model: &str) -> bool {
        self.bindings.contains_key(model)
    }

    pub fn binding(&self, model: &str) -> Result<BackendKind, ProviderError> {
        self.bindings
            .get(model)
            .copied()
            .ok_or_else(|| ProviderError::unknown_model(model))
    }

    pub fn backend_for(&self, model: &str) -> Result<&dyn ModelBackend, ProviderError> {
        let kind = self.binding(model)?;
        self.backends
            .get(&kind)
            .map(|backend| backend.as_ref())
            .ok_or_else(|| ProviderError::unknown_model(model))
    }

    /// Queries the bound backend for `model`'s context length.
    pub async fn resolve_metadata(&self, model: &str) -> Result<ModelInfo, ProviderError> {
        let backend = self.backend_for(model)?;
        backend.show(model).await
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ModelDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDirectory")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}
