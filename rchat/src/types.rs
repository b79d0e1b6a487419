//! Session message types.
//!
//! Messages serialize with a `role` tag, matching the stored history format:
//!
//! ```rust
//! use rchat::ChatMessage;
//!
//! let file = ChatMessage::file("notes.md", "md", "# Notes");
//! assert_eq!(file.role_name(), "file");
//! assert!(file.content().is_none());
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System {
        content: String,
    },
    /// Attached text file; `ext` has no leading dot.
    File {
        name: String,
        ext: String,
        data: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: String,
    },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
        }
    }

    pub fn file(name: impl Into<String>, ext: impl Into<String>, data: impl Into<String>) -> Self {
        Self::File {
            name: name.into(),
            ext: ext.into(),
            data: data.into(),
        }
    }

    pub fn role_name(&self) -> &'static str {
        match self {
            Self::System { .. } => "system",
            Self::File { .. } => "file",
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Self::System { .. })
    }

    pub fn is_assistant(&self) -> bool {
        matches!(self, Self::Assistant { .. })
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Self::System { content } | Self::User { content } | Self::Assistant { content } => {
                Some(content)
            }
            Self::File { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_serialize_with_role_tag() {
        let json = serde_json::to_value(ChatMessage::file("a.rs", "rs", "fn main() {}"))
            .expect("message should serialize");
        assert_eq!(json["role"], "file");
        assert_eq!(json["name"], "a.rs");
        assert_eq!(json["ext"], "rs");

        let parsed: ChatMessage =
            serde_json::from_str(r#"{"role":"assistant","content":"hello"}"#)
                .expect("message should parse");
        assert_eq!(parsed, ChatMessage::assistant("hello"));
    }
}
