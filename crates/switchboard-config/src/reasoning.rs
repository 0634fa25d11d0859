use serde::Deserialize;

/// Reasoning trace presentation
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReasoningConfig {
    #[serde(default)]
    pub mode: ReasoningMode,
}

/// How a backend reasoning trace reaches the client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningMode {
    /// Surface the trace as `reasoning_content` next to `content`
    #[default]
    Separate,
    /// Prepend the trace to `content`, for clients that reject unknown fields
    Merged,
}
