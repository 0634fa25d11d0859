//! DeepSeek chat completion API wire format types (backend side)

use serde::{Deserialize, Serialize};

use crate::types::{ChatMessage, ToolSpec};

/// DeepSeek chat completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepSeekRequest {
    /// Backend model identifier
    pub model: String,
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Whether to stream the response
    pub stream: bool,
    /// Sampling temperature, omitted for models that reject it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Tool definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,
    /// Tool choice strategy, only "auto" or "none"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
}

/// DeepSeek chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepSeekResponse {
    /// Response identifier
    pub id: String,
    /// Object type
    #[serde(default)]
    pub object: String,
    /// Creation timestamp
    pub created: u64,
    /// Backend model that produced the response
    pub model: String,
    /// Generated choices
    pub choices: Vec<DeepSeekChoice>,
    /// Token usage
    #[serde(default)]
    pub usage: Option<DeepSeekUsage>,
}

/// Choice within a DeepSeek response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepSeekChoice {
    /// Choice index
    pub index: u32,
    /// Generated message
    pub message: ChatMessage,
    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage in a DeepSeek response
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DeepSeekUsage {
    /// Prompt tokens
    pub prompt_tokens: u32,
    /// Completion tokens
    pub completion_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
}
