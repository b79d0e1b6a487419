//! Gateway configuration with environment overrides.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use rapport::GatewayConfig;
//!
//! let config = GatewayConfig::from_lookup(|key| match key {
//!     "OLLAMA_HOST" => Some("http://gpu-box:11434".to_string()),
//!     _ => None,
//! })
//! .with_timeout(Duration::from_secs(30));
//!
//! assert_eq!(config.ollama_host, "http://gpu-box:11434");
//! assert!(config.anthropic_api_key.is_none());
//! ```

use std::fmt::{Debug, Formatter};
use std::time::Duration;

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub ollama_host: String,
    /// The hosted backend is enabled only when a key is present.
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: String,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            anthropic_api_key: None,
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(host) = read(OLLAMA_HOST_ENV) {
            config.ollama_host = host;
        }
        config.anthropic_api_key = read(ANTHROPIC_API_KEY_ENV);
        config
    }

    pub fn with_ollama_host(mut self, host: impl Into<String>) -> Self {
        self.ollama_host = host.into();
        self
    }

    pub fn with_anthropic_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.anthropic_api_key = Some(api_key).filter(|key| !key.trim().is_empty());
        self
    }

    pub fn with_anthropic_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.anthropic_base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_anthropic_key(&self) -> bool {
        self.anthropic_api_key.is_some()
    }
}

impl Debug for GatewayConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("ollama_host", &self.ollama_host)
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("anthropic_base_url", &self.anthropic_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
