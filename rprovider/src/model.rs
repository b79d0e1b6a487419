//! Backend-agnostic request, message, and model metadata types.
//!
//! ```rust
//! use rprovider::{ChatOptions, ChatRequest, Message, ProviderErrorKind, Role};
//!
//! let ok = ChatRequest::new("llama3:latest", vec![Message::new(Role::User, "hi")])
//!     .with_options(ChatOptions::default().with_num_ctx(4096));
//! assert!(ok.validate().is_ok());
//!
//! let err = ChatRequest::new("", vec![Message::new(Role::User, "hi")])
//!     .validate()
//!     .expect_err("empty model should fail");
//! assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
//! ```

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ProviderError;

/// Closed set of backend kinds a directory entry can be bound to.
///
/// Ordering puts the local server ahead of hosted APIs; directory listings
/// rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendKind {
    Ollama,
    Anthropic,
}

impl BackendKind {
    pub fn is_local(self) -> bool {
        matches!(self, Self::Ollama)
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            Self::Ollama => "ollama",
            Self::Anthropic => "anthropic",
        };

        f.write_str(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub context_length: u32,
}

impl ModelInfo {
    pub fn new(name: impl Into<String>, context_length: u32) -> Self {
        Self {
            name: name.into(),
            context_length,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChatOptions {
    /// Context window cap forwarded to local backends.
    pub num_ctx: Option<u32>,
}

impl ChatOptions {
    pub fn with_num_ctx(mut self, num_ctx: u32) -> Self {
        self.num_ctx = Some(num_ctx);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: ChatOptions,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: ChatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_num_ctx(mut self, num_ctx: u32) -> Self {
        self.options.num_ctx = Some(num_ctx);
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        if let Some(num_ctx) = self.options.num_ctx
            && num_ctx == 0
        {
            return Err(ProviderError::invalid_request(
                "num_ctx must be greater than zero",
            ));
        }

        Ok(())
    }
}
