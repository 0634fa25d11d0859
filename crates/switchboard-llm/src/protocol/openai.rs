//! `OpenAI` chat completion API wire format types (client side)

use serde::{Deserialize, Serialize};

use crate::types::{FunctionSpec, ToolInvocation, ToolSpec, null_as_default};

// -- Request types --

/// `OpenAI` chat completion request as sent by clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiRequest {
    /// Model identifier requested by the client
    pub model: String,
    /// Conversation messages
    pub messages: Vec<OpenAiMessage>,
    /// Whether to stream the response
    #[serde(default, deserialize_with = "null_as_default")]
    pub stream: bool,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Tool definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub tools: Vec<ToolSpec>,
    /// Tool choice, either a string or an object naming a function
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<serde_json::Value>,
    /// Legacy function definitions predating `tools`
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub functions: Vec<FunctionSpec>,
}

/// Message author role as accepted from clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenAiRole {
    System,
    User,
    Assistant,
    Tool,
    /// Legacy role for function results
    Function,
}

/// `OpenAI` message within a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiMessage {
    /// Message role
    pub role: OpenAiRole,
    /// Content (string or array of content parts)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<OpenAiContent>,
    /// Participant name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tool calls made by the assistant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolInvocation>>,
    /// Tool call ID this message responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// `OpenAI` content can be a string or array of content parts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpenAiContent {
    /// Plain text content
    Text(String),
    /// Array of content parts
    Parts(Vec<OpenAiContentPart>),
}

impl OpenAiContent {
    /// Extract text content, joining text parts and skipping everything else
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter(|part| part.kind == "text")
                .filter_map(|part| part.text.as_deref())
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

/// Individual content part; only text parts survive translation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiContentPart {
    /// Part type such as "text" or "image_url"
    #[serde(rename = "type")]
    pub kind: String,
    /// Text of a "text" part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// -- Response types --

/// `OpenAI` chat completion response as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiResponse {
    /// Response identifier
    pub id: String,
    /// Object type (always "chat.completion")
    pub object: String,
    /// Creation timestamp
    pub created: u64,
    /// Model identifier the client requested
    pub model: String,
    /// Generated choices
    pub choices: Vec<OpenAiChoice>,
    /// Token usage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<OpenAiUsage>,
}

/// Choice within an `OpenAI` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiChoice {
    /// Choice index
    pub index: u32,
    /// Generated message
    pub message: OpenAiChoiceMessage,
    /// Why generation stopped
    pub finish_reason: Option<String>,
}

/// Message within an `OpenAI` response choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiChoiceMessage {
    /// Role (always "assistant" in practice)
    pub role: String,
    /// Text content, `null` for tool-call-only messages
    pub content: Option<String>,
    /// Reasoning trace, only when surfaced separately
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
    /// Tool calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolInvocation>>,
    /// Tool call ID this message responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Participant name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Token usage in an `OpenAI` response
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OpenAiUsage {
    /// Prompt tokens
    pub prompt_tokens: u32,
    /// Completion tokens
    pub completion_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
}

// -- Models list types --

/// `OpenAI` models list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiModelList {
    /// Object type (always "list")
    pub object: String,
    /// List of models
    pub data: Vec<OpenAiModel>,
}

/// `OpenAI` model entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiModel {
    /// Model identifier
    pub id: String,
    /// Object type (always "model")
    pub object: String,
    /// Creation timestamp
    #[serde(default)]
    pub created: u64,
    /// Owner
    #[serde(default)]
    pub owned_by: String,
}

// -- Error response --

/// `OpenAI` error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiErrorResponse {
    /// Error details
    pub error: OpenAiErrorDetail,
}

/// `OpenAI` error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiErrorDetail {
    /// Error message
    pub message: String,
    /// Error type
    #[serde(rename = "type")]
    pub error_type: String,
    /// Machine-readable error code
    #[serde(default)]
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_request_decodes() {
        let request: OpenAiRequest =
            serde_json::from_str(r#"{"model":"gpt-4","messages":[{"role":"user","content":"hi"}]}"#).unwrap();

        assert!(!request.stream);
        assert!(request.tools.is_empty());
        assert!(request.temperature.is_none());
        assert_eq!(request.messages[0].role, OpenAiRole::User);
    }

    #[test]
    fn multipart_content_flattens_to_text() {
        let message: OpenAiMessage = serde_json::from_str(
            r#"{"role":"user","content":[
                {"type":"text","text":"describe "},
                {"type":"image_url","image_url":{"url":"https://example.com/cat.png"}},
                {"type":"text","text":"this"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(message.content.unwrap().as_text(), "describe this");
    }

    #[test]
    fn legacy_function_role_decodes() {
        let message: OpenAiMessage =
            serde_json::from_str(r#"{"role":"function","name":"lookup","content":"42"}"#).unwrap();
        assert_eq!(message.role, OpenAiRole::Function);
    }

    #[test]
    fn tool_choice_keeps_object_form() {
        let request: OpenAiRequest = serde_json::from_str(
            r#"{"model":"gpt-4","messages":[],"tool_choice":{"type":"function","function":{"name":"lookup"}}}"#,
        )
        .unwrap();

        assert!(request.tool_choice.unwrap().is_object());
    }
}
