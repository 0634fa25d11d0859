use serde_json::Value;
use switchboard_config::CompatConfig;

use super::Degradation;
use crate::policy::{ModelCapabilities, ModelPolicyTable};
use crate::protocol::deepseek::DeepSeekRequest;
use crate::protocol::openai::{OpenAiMessage, OpenAiRequest, OpenAiRole};
use crate::types::{ChatMessage, Role, ToolInvocation, ToolSpec};

/// Temperature sent when the client omits one and the model accepts it
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// A backend request plus what the translator learned on the way
#[derive(Debug, Clone)]
pub struct TranslatedRequest {
    pub request: DeepSeekRequest,
    /// Capabilities of the backend model the request targets
    pub capabilities: ModelCapabilities,
    pub degradations: Vec<Degradation>,
}

/// Rewrite a client request into the backend shape
pub fn translate_request(front: OpenAiRequest, table: &ModelPolicyTable) -> TranslatedRequest {
    let mut degradations = Vec::new();

    let resolved = table.resolve(&front.model);
    if resolved.fallback {
        degradations.push(Degradation::UnknownModel {
            requested: front.model.clone(),
            fallback: resolved.backend_model.clone(),
        });
    }

    let temperature = if resolved.capabilities.ignores_sampling_params {
        if let Some(requested) = front.temperature {
            degradations.push(Degradation::TemperatureDropped {
                model: resolved.backend_model.clone(),
                requested,
            });
        }
        None
    } else {
        Some(front.temperature.unwrap_or(DEFAULT_TEMPERATURE))
    };

    let tools = if front.tools.is_empty() {
        front.functions.into_iter().map(ToolSpec::function).collect()
    } else {
        front.tools
    };

    let tool_choice = if tools.is_empty() {
        None
    } else {
        if !resolved.capabilities.supports_tools {
            degradations.push(Degradation::ToolsUnsupported {
                model: resolved.backend_model.clone(),
            });
        }

        let (choice, downgrade) = classify_tool_choice(front.tool_choice.as_ref());
        degradations.extend(downgrade);
        Some(choice)
    };

    let request = DeepSeekRequest {
        model: resolved.backend_model,
        messages: front.messages.into_iter().map(convert_message).collect(),
        stream: front.stream,
        temperature,
        max_tokens: front.max_tokens,
        tools,
        tool_choice,
    };

    TranslatedRequest {
        request,
        capabilities: resolved.capabilities,
        degradations,
    }
}

/// Cap `max_tokens` for clients matched by the compatibility profile
///
/// An absent limit, or one above the threshold, is replaced by the cap.
pub fn apply_max_tokens_cap(request: &mut DeepSeekRequest, compat: &CompatConfig) -> Option<Degradation> {
    let needs_cap = request
        .max_tokens
        .is_none_or(|requested| requested > compat.max_tokens_threshold);

    if !needs_cap {
        return None;
    }

    let requested = request.max_tokens.replace(compat.max_tokens_cap);

    Some(Degradation::MaxTokensCapped {
        requested,
        cap: compat.max_tokens_cap,
    })
}

/// Reduce a client `tool_choice` to the strings the backend accepts
fn classify_tool_choice(choice: Option<&Value>) -> (String, Option<Degradation>) {
    match choice {
        None => ("auto".to_owned(), None),
        Some(Value::String(choice)) if choice == "auto" || choice == "none" => (choice.clone(), None),
        Some(other) => (
            "auto".to_owned(),
            Some(Degradation::ToolChoiceDowngraded {
                original: other.to_string(),
            }),
        ),
    }
}

fn convert_message(message: OpenAiMessage) -> ChatMessage {
    let role = match message.role {
        OpenAiRole::System => Role::System,
        OpenAiRole::User => Role::User,
        OpenAiRole::Assistant => Role::Assistant,
        OpenAiRole::Tool | OpenAiRole::Function => Role::Tool,
    };

    let tool_calls = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| ToolInvocation {
            kind: "function".to_owned(),
            ..call
        })
        .collect();

    ChatMessage {
        role,
        content: message.content.map(|content| content.as_text()).unwrap_or_default(),
        reasoning_content: None,
        tool_calls,
        tool_call_id: message.tool_call_id,
        name: message.name,
    }
}
