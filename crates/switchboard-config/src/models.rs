use indexmap::IndexMap;
use serde::Deserialize;

/// Backend model used when a front identifier is not in the mapping
pub const DEFAULT_BACKEND_MODEL: &str = "deepseek-reasoner";

/// Front-to-back model mapping and the capabilities of each backend model
///
/// Omitted keys fall back to the built-in DeepSeek table, so a config that
/// only overrides `default_model` keeps the stock mapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelsConfig {
    /// Backend model for unknown front identifiers
    pub default_model: String,
    /// Front identifier -> backend identifier
    pub mapping: IndexMap<String, String>,
    /// Capabilities keyed by backend identifier
    pub capabilities: IndexMap<String, ModelCapabilityConfig>,
}

/// Capability flags of one backend model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelCapabilityConfig {
    /// Model accepts `tools` / `tool_choice`
    pub supports_tools: bool,
    /// Model rejects sampling parameters such as `temperature`
    pub ignores_sampling_params: bool,
    /// Model produces a reasoning trace
    pub reasoning: bool,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        let mapping = [
            ("o3", "deepseek-reasoner"),
            ("o3-preview", "deepseek-reasoner"),
            ("o3-mini", "deepseek-reasoner"),
            ("o4-mini", "deepseek-reasoner"),
            ("gpt-4o", "deepseek-reasoner"),
            ("gpt-4", "deepseek-chat"),
            ("gpt-3.5-turbo", "deepseek-chat"),
            ("deepseek-chat", "deepseek-chat"),
            ("deepseek-coder", "deepseek-coder"),
            ("deepseek-reasoner", "deepseek-reasoner"),
        ]
        .into_iter()
        .map(|(front, back)| (front.to_string(), back.to_string()))
        .collect();

        let chat = ModelCapabilityConfig {
            supports_tools: true,
            ..ModelCapabilityConfig::default()
        };
        let reasoner = ModelCapabilityConfig {
            supports_tools: false,
            ignores_sampling_params: true,
            reasoning: true,
        };

        let capabilities = [
            ("deepseek-chat", chat),
            ("deepseek-coder", chat),
            ("deepseek-reasoner", reasoner),
        ]
        .into_iter()
        .map(|(model, caps)| (model.to_string(), caps))
        .collect();

        Self {
            default_model: DEFAULT_BACKEND_MODEL.to_string(),
            mapping,
            capabilities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_covers_every_target() {
        let config = ModelsConfig::default();
        for target in config.mapping.values() {
            assert!(config.capabilities.contains_key(target), "missing capabilities for {target}");
        }
        assert!(config.capabilities.contains_key(&config.default_model));
    }

    #[test]
    fn partial_section_keeps_builtin_mapping() {
        let config: ModelsConfig = toml::from_str(r#"default_model = "deepseek-chat""#).unwrap();
        assert_eq!(config.default_model, "deepseek-chat");
        assert_eq!(config.mapping.get("o3").map(String::as_str), Some("deepseek-reasoner"));
    }

    #[test]
    fn custom_capabilities_parse() {
        let config: ModelsConfig = toml::from_str(
            r#"
            [mapping]
            "front-model-x" = "back-reasoner"

            [capabilities.back-reasoner]
            reasoning = true
            ignores_sampling_params = true
            "#,
        )
        .unwrap();

        let caps = config.capabilities["back-reasoner"];
        assert!(caps.reasoning);
        assert!(caps.ignores_sampling_params);
        assert!(!caps.supports_tools);
        assert_eq!(config.mapping.len(), 1);
    }
}
