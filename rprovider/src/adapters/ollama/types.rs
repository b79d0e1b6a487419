//! Ollama wire types for `/api/tags`, `/api/show`, and `/api/chat`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Message;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<OllamaMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "OllamaOptions::is_empty")]
    pub options: OllamaOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
}

impl OllamaOptions {
    fn is_empty(&self) -> bool {
        self.num_ctx.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OllamaMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl From<Message> for OllamaMessage {
    fn from(value: Message) -> Self {
        Self {
            role: value.role.as_str().to_string(),
            content: value.content,
        }
    }
}

/// One NDJSON line of a streamed `/api/chat` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OllamaChatChunk {
    #[serde(default)]
    pub message: Option<OllamaMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OllamaTagsResponse {
    #[serde(default)]
    pub models: Vec<OllamaModelTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OllamaModelTag {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl OllamaModelTag {
    /// Older servers only report `name`; newer ones report both.
    pub fn id(&self) -> Option<&str> {
        self.model
            .as_deref()
            .or(self.name.as_deref())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OllamaShowRequest {
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct OllamaShowResponse {
    #[serde(default)]
    pub model_info: Map<String, Value>,
    #[serde(default)]
    pub details: OllamaModelDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct OllamaModelDetails {
    #[serde(default)]
    pub family: Option<String>,
}

impl OllamaShowResponse {
    /// Reads `"<family>.context_length"` from `model_info`.
    pub fn context_length(&self) -> Option<u32> {
        let family = self.details.family.as_deref()?;
        let value = self.model_info.get(&format!("{family}.context_length"))?;

        value
            .as_u64()
            .filter(|length| *length > 0)
            .and_then(|length| u32::try_from(length).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_response_reads_family_scoped_context_length() {
        let response: OllamaShowResponse = serde_json::from_str(
            r#"{"model_info":{"llama.context_length":131072,"general.architecture":"llama"},"details":{"family":"llama"}}"#,
        )
        .expect("show response should parse");

        assert_eq!(response.context_length(), Some(131_072));
    }

    #[test]
    fn show_response_without_family_or_field_has_no_context_length() {
        let no_family: OllamaShowResponse =
            serde_json::from_str(r#"{"model_info":{"llama.context_length":4096},"details":{}}"#)
                .expect("show response should parse");
        assert_eq!(no_family.context_length(), None);

        let no_field: OllamaShowResponse =
            serde_json::from_str(r#"{"model_info":{},"details":{"family":"qwen2"}}"#)
                .expect("show response should parse");
        assert_eq!(no_field.context_length(), None);
    }

    #[test]
    fn model_tag_prefers_model_over_name() {
        let tags: OllamaTagsResponse = serde_json::from_str(
            r#"{"models":[{"name":"llama3:latest","model":"llama3:latest"},{"name":"phi3:mini"}]}"#,
        )
        .expect("tags should parse");

        let ids = tags
            .models
            .iter()
            .filter_map(OllamaModelTag::id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["llama3:latest", "phi3:mini"]);
    }

    #[test]
    fn chat_request_serializes_num_ctx_under_options() {
        let request = OllamaChatRequest {
            model: "llama3:latest".to_string(),
            messages: vec![OllamaMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
            stream: true,
            options: OllamaOptions { num_ctx: Some(2048) },
        };

        let json = serde_json::to_value(&request).expect("request should serialize");
        assert_eq!(json["options"]["num_ctx"], 2048);
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
