//! Anthropic-specific credential helpers.

use crate::{BackendKind, ProviderError, SecretString, SecureCredentialManager};

impl SecureCredentialManager {
    /// Stores an Anthropic API key, trimmed.
    ///
    /// The key format is not checked locally; a key the API rejects fails
    /// the request that used it.
    pub fn set_anthropic_api_key(&self, api_key: impl Into<String>) -> Result<(), ProviderError> {
        let api_key = api_key.into();
        self.set_api_key(BackendKind::Anthropic, api_key.trim())
    }
}

pub(crate) fn resolve_anthropic_key(
    credentials: &SecureCredentialManager,
) -> Result<SecretString, ProviderError> {
    credentials
        .api_key(BackendKind::Anthropic)?
        .ok_or_else(|| ProviderError::authentication("no Anthropic API key configured"))
}
