//! Conversion between the client-facing and backend-facing schemas
//!
//! Request translation never fails; anything it has to downgrade is
//! reported as a [`Degradation`] so callers can log it.

mod chunk;
mod request;
mod response;

use std::fmt;

pub use chunk::rewrite_chunk;
pub use request::{DEFAULT_TEMPERATURE, TranslatedRequest, apply_max_tokens_cap, translate_request};
pub use response::translate_response;

/// A request field silently replaced with a safe value
#[derive(Debug, Clone, PartialEq)]
pub enum Degradation {
    /// Requested model is not in the table; the default model was used
    UnknownModel { requested: String, fallback: String },
    /// Target model rejects sampling parameters; `temperature` was dropped
    TemperatureDropped { model: String, requested: f64 },
    /// `tool_choice` was neither "auto" nor "none"; "auto" was sent instead
    ToolChoiceDowngraded { original: String },
    /// Tools were forwarded to a model not flagged as supporting them
    ToolsUnsupported { model: String },
    /// Client compatibility profile replaced `max_tokens`
    MaxTokensCapped { requested: Option<u32>, cap: u32 },
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownModel { requested, fallback } => {
                write!(f, "unknown model '{requested}', using '{fallback}'")
            }
            Self::TemperatureDropped { model, requested } => {
                write!(f, "'{model}' ignores sampling parameters, dropped temperature {requested}")
            }
            Self::ToolChoiceDowngraded { original } => write!(f, "tool_choice {original} downgraded to \"auto\""),
            Self::ToolsUnsupported { model } => write!(f, "'{model}' is not flagged for tools, forwarding anyway"),
            Self::MaxTokensCapped { requested: Some(requested), cap } => {
                write!(f, "max_tokens {requested} capped to {cap}")
            }
            Self::MaxTokensCapped { requested: None, cap } => write!(f, "max_tokens unset, capped to {cap}"),
        }
    }
}
