//! Chat-layer errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

use rprovider::{ProviderError, ProviderErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidRequest,
    InvalidState,
    UnknownModel,
    Provider,
    Store,
    Attachment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidState, message)
    }

    pub fn unknown_model(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::UnknownModel, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Provider, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Store, message)
    }

    pub fn attachment(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Attachment, message)
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        match value.kind {
            ProviderErrorKind::UnknownModel => ChatError::unknown_model(value.message),
            _ => ChatError::provider(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_keep_unknown_model_distinct() {
        let unknown = ChatError::from(ProviderError::unknown_model("ghost:1b"));
        assert_eq!(unknown.kind, ChatErrorKind::UnknownModel);
        assert!(unknown.message.contains("ghost:1b"));

        let upstream = ChatError::from(ProviderError::unavailable("connection refused"));
        assert_eq!(upstream.kind, ChatErrorKind::Provider);
        assert_eq!(upstream.message, "Unavailable: connection refused");
    }
}
