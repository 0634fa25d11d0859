use switchboard_config::ReasoningMode;

use crate::policy::ModelCapabilities;
use crate::protocol::deepseek::{DeepSeekChoice, DeepSeekResponse};
use crate::protocol::openai::{OpenAiChoice, OpenAiChoiceMessage, OpenAiResponse, OpenAiUsage};
use crate::types::{ChatMessage, Role};

/// Rewrite a complete backend response into the client schema
///
/// The `model` field always carries `requested_model`. In separate mode the
/// trace becomes `reasoning_content`, for reasoning-capable backend models
/// only. In merged mode any trace is prepended to `content`.
pub fn translate_response(
    back: DeepSeekResponse,
    requested_model: &str,
    capabilities: ModelCapabilities,
    mode: ReasoningMode,
) -> OpenAiResponse {
    let choices = back
        .choices
        .into_iter()
        .map(|choice| convert_choice(choice, capabilities, mode))
        .collect();

    OpenAiResponse {
        id: back.id,
        object: "chat.completion".to_owned(),
        created: back.created,
        model: requested_model.to_owned(),
        choices,
        usage: back.usage.map(|usage| OpenAiUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }),
    }
}

fn convert_choice(choice: DeepSeekChoice, capabilities: ModelCapabilities, mode: ReasoningMode) -> OpenAiChoice {
    OpenAiChoice {
        index: choice.index,
        message: convert_message(choice.message, capabilities, mode),
        finish_reason: choice.finish_reason,
    }
}

fn convert_message(message: ChatMessage, capabilities: ModelCapabilities, mode: ReasoningMode) -> OpenAiChoiceMessage {
    let trace = message.reasoning_content.filter(|trace| !trace.is_empty());

    let (content, reasoning_content) = match (mode, trace) {
        (ReasoningMode::Separate, trace) => (message.content, trace.filter(|_| capabilities.reasoning)),
        (ReasoningMode::Merged, Some(trace)) if message.content.is_empty() => (trace, None),
        (ReasoningMode::Merged, Some(trace)) => (format!("{trace}\n\n{}", message.content), None),
        (ReasoningMode::Merged, None) => (message.content, None),
    };

    // Tool-call-only messages carry `content: null` on the OpenAI wire
    let content = if content.is_empty() && !message.tool_calls.is_empty() {
        None
    } else {
        Some(content)
    };

    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    OpenAiChoiceMessage {
        role: role.to_owned(),
        content,
        reasoning_content,
        tool_calls: (!message.tool_calls.is_empty()).then_some(message.tool_calls),
        tool_call_id: message.tool_call_id,
        name: message.name,
    }
}
