//! Small convenience constructors for common types.

use rchat::ChatMessage;
use rprovider::{Message, Role};

pub fn system_message(content: impl Into<String>) -> Message {
    Message::new(Role::System, content)
}

pub fn user_message(content: impl Into<String>) -> Message {
    Message::new(Role::User, content)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::new(Role::Assistant, content)
}

/// A `file` history entry, as produced by `/include`.
pub fn file_message(
    name: impl Into<String>,
    ext: impl Into<String>,
    data: impl Into<String>,
) -> ChatMessage {
    ChatMessage::file(name, ext, data)
}

#[cfg(test)]
mod tests {
    use rchat::ChatMessage;
    use rprovider::Role;

    use super::{file_message, system_message, user_message};

    #[test]
    fn message_helpers_apply_expected_roles() {
        assert_eq!(system_message("be brief").role, Role::System);
        assert_eq!(user_message("hello").role, Role::User);
        assert_eq!(
            file_message("main.rs", "rs", "fn main() {}"),
            ChatMessage::File {
                name: "main.rs".to_string(),
                ext: "rs".to_string(),
                data: "fn main() {}".to_string(),
            }
        );
    }
}
