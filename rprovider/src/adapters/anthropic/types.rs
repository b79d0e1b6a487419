//! Anthropic Messages API request and streaming event types.

use serde::{Deserialize, Serialize};

use crate::{Message, ProviderError, Role};

pub const ANTHROPIC_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub system: String,
    pub messages: Vec<AnthropicMessage>,
    pub stream: bool,
}

impl AnthropicRequest {
    /// Lifts system messages into the `system` field, joined by a blank line,
    /// and keeps every other message in order.
    pub fn from_messages(model: impl Into<String>, messages: Vec<Message>) -> Self {
        let (system, rest): (Vec<Message>, Vec<Message>) = messages
            .into_iter()
            .partition(|message| message.role == Role::System);

        Self {
            model: model.into(),
            max_tokens: ANTHROPIC_MAX_TOKENS,
            system: system
                .into_iter()
                .map(|message| message.content)
                .collect::<Vec<_>>()
                .join("\n\n"),
            messages: rest.into_iter().map(AnthropicMessage::from).collect(),
            stream: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnthropicMessage {
    pub role: &'static str,
    pub content: String,
}

impl From<Message> for AnthropicMessage {
    fn from(value: Message) -> Self {
        Self {
            role: value.role.as_str(),
            content: value.content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicStreamEvent {
    MessageStart {},
    ContentBlockStart {},
    ContentBlockDelta { delta: AnthropicDelta },
    ContentBlockStop {},
    MessageDelta {},
    MessageStop {},
    Ping {},
    Error { error: AnthropicErrorBody },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicDelta {
    TextDelta { text: String },
    InputJsonDelta { partial_json: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnthropicErrorBody {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

impl From<AnthropicErrorBody> for ProviderError {
    fn from(value: AnthropicErrorBody) -> Self {
        let message = if value.message.is_empty() {
            value.kind.clone()
        } else {
            value.message
        };

        match value.kind.as_str() {
            "overloaded_error" | "api_error" => ProviderError::unavailable(message),
            "rate_limit_error" => ProviderError::rate_limited(message),
            "authentication_error" | "permission_error" => ProviderError::authentication(message),
            "invalid_request_error" => ProviderError::invalid_request(message),
            "not_found_error" => ProviderError::not_found(message),
            _ => ProviderError::transport(message),
        }
    }
}

/// Error envelope returned with non-success HTTP statuses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct AnthropicErrorEnvelope {
    pub error: AnthropicErrorBody,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorKind;

    #[test]
    fn text_delta_events_parse() {
        let event: AnthropicStreamEvent = serde_json::from_str(
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hel"}}"#,
        )
        .expect("delta should parse");

        assert_eq!(
            event,
            AnthropicStreamEvent::ContentBlockDelta {
                delta: AnthropicDelta::TextDelta {
                    text: "Hel".to_string()
                }
            }
        );
    }

    #[test]
    fn unrecognized_events_and_deltas_fall_through() {
        let event: AnthropicStreamEvent =
            serde_json::from_str(r#"{"type":"brand_new_event","payload":1}"#)
                .expect("unknown event should parse");
        assert_eq!(event, AnthropicStreamEvent::Unknown);

        let event: AnthropicStreamEvent = serde_json::from_str(
            r#"{"type":"content_block_delta","index":1,"delta":{"type":"thinking_delta","thinking":"hm"}}"#,
        )
        .expect("unknown delta should parse");
        assert_eq!(
            event,
            AnthropicStreamEvent::ContentBlockDelta {
                delta: AnthropicDelta::Other
            }
        );

        let event: AnthropicStreamEvent = serde_json::from_str(
            r#"{"type":"message_start","message":{"id":"msg_1","role":"assistant"}}"#,
        )
        .expect("message_start should parse");
        assert_eq!(event, AnthropicStreamEvent::MessageStart {});
    }

    #[test]
    fn error_bodies_map_to_provider_error_kinds() {
        let overloaded = ProviderError::from(AnthropicErrorBody {
            kind: "overloaded_error".to_string(),
            message: "Overloaded".to_string(),
        });
        assert_eq!(overloaded.kind, ProviderErrorKind::Unavailable);
        assert_eq!(overloaded.message, "Overloaded");

        let auth = ProviderError::from(AnthropicErrorBody {
            kind: "authentication_error".to_string(),
            message: String::new(),
        });
        assert_eq!(auth.kind, ProviderErrorKind::Authentication);
        assert_eq!(auth.message, "authentication_error");
    }

    #[test]
    fn request_serialization_omits_empty_system() {
        let request = AnthropicRequest::from_messages(
            "claude-3-5-haiku-latest",
            vec![Message::new(Role::User, "Hi")],
        );

        let json = serde_json::to_value(&request).expect("request should serialize");
        assert!(json.get("system").is_none());
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
