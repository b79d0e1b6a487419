//! Ordering of session history into model-ready messages.
//!
//! System messages come first, then one assistant message per attached file,
//! then everything else in its original order.
//!
//! ```rust
//! use rchat::{ChatMessage, compose};
//! use rprovider::{Message, Role};
//!
//! let history = vec![ChatMessage::system("You are helpful"), ChatMessage::user("Hi")];
//!
//! assert_eq!(
//!     compose(&history),
//!     vec![
//!         Message::new(Role::System, "You are helpful"),
//!         Message::new(Role::User, "Hi"),
//!     ]
//! );
//! ```

use rprovider::{Message, Role};

use crate::ChatMessage;

const RULE: &str = "---";

/// Renders an attached file as assistant-visible text.
pub fn render_attachment(name: &str, data: &str) -> String {
    format!("`{name}`\n{RULE}\n{data}\n\n{RULE}")
}

/// Recovers `(name, data)` from text produced by [`render_attachment`].
pub fn extract_attachment(content: &str) -> Option<(String, String)> {
    let rest = content.strip_prefix('`')?;
    let (name, rest) = rest.split_once(&format!("`\n{RULE}\n"))?;
    let data = rest.strip_suffix(&format!("\n\n{RULE}"))?;

    Some((name.to_string(), data.to_string()))
}

pub fn compose(messages: &[ChatMessage]) -> Vec<Message> {
    let mut system = Vec::new();
    let mut files = Vec::new();
    let mut rest = Vec::new();

    for message in messages {
        match message {
            ChatMessage::System { content } => system.push(Message::new(Role::System, content)),
            ChatMessage::File { name, data, .. } => {
                files.push(Message::new(Role::Assistant, render_attachment(name, data)))
            }
            ChatMessage::User { content } => rest.push(Message::new(Role::User, content)),
            ChatMessage::Assistant { content } => {
                rest.push(Message::new(Role::Assistant, content))
            }
        }
    }

    system.extend(files);
    system.extend(rest);
    system
}
