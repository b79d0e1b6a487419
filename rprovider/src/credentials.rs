//! Secure in-memory API key storage for hosted backends.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::{BackendKind, ProviderError};

#[derive(Clone, PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // SAFETY: zero bytes are valid UTF-8 and the string is not read again.
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

#[derive(Default)]
pub struct SecureCredentialManager {
    api_keys: Mutex<HashMap<BackendKind, SecretString>>,
}

impl std::fmt::Debug for SecureCredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureCredentialManager")
            .finish_non_exhaustive()
    }
}

impl SecureCredentialManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_api_key(
        &self,
        backend: BackendKind,
        api_key: impl Into<String>,
    ) -> Result<(), ProviderError> {
        let api_key = SecretString::new(api_key);
        if api_key.is_empty() {
            return Err(ProviderError::authentication("api key must not be empty"));
        }

        self.api_keys_guard()?.insert(backend, api_key);
        Ok(())
    }

    pub fn has_credentials(&self, backend: BackendKind) -> Result<bool, ProviderError> {
        Ok(self.api_keys_guard()?.contains_key(&backend))
    }

    pub fn api_key(&self, backend: BackendKind) -> Result<Option<SecretString>, ProviderError> {
        Ok(self.api_keys_guard()?.get(&backend).cloned())
    }

    pub fn with_api_key<R>(
        &self,
        backend: BackendKind,
        f: impl FnOnce(&str) -> R,
    ) -> Result<Option<R>, ProviderError> {
        Ok(self
            .api_keys_guard()?
            .get(&backend)
            .map(|secret| f(secret.expose())))
    }

    pub fn clear(&self, backend: BackendKind) -> Result<bool, ProviderError> {
        Ok(self.api_keys_guard()?.remove(&backend).is_some())
    }

    fn api_keys_guard(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<BackendKind, SecretString>>, ProviderError> {
        self.api_keys
            .lock()
            .map_err(|_| ProviderError::other("credential manager lock poisoned"))
    }
}
