//! Front-to-back model mapping and per-model capability flags

use indexmap::IndexMap;
use switchboard_config::{ModelCapabilityConfig, ModelsConfig};

/// Capability flags of one backend model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelCapabilities {
    /// Model accepts `tools` / `tool_choice`
    pub supports_tools: bool,
    /// Model rejects sampling parameters such as `temperature`
    pub ignores_sampling_params: bool,
    /// Model produces a reasoning trace
    pub reasoning: bool,
}

impl From<ModelCapabilityConfig> for ModelCapabilities {
    fn from(config: ModelCapabilityConfig) -> Self {
        Self {
            supports_tools: config.supports_tools,
            ignores_sampling_params: config.ignores_sampling_params,
            reasoning: config.reasoning,
        }
    }
}

/// Outcome of looking up a front model identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    /// Backend identifier to send upstream
    pub backend_model: String,
    /// Flags of the backend model
    pub capabilities: ModelCapabilities,
    /// The front identifier was unknown and the default model was used
    pub fallback: bool,
}

/// Immutable model table, built once at startup and shared read-only
#[derive(Debug, Clone)]
pub struct ModelPolicyTable {
    default_model: String,
    mapping: IndexMap<String, String>,
    capabilities: IndexMap<String, ModelCapabilities>,
}

impl ModelPolicyTable {
    /// Build the table from validated configuration
    pub fn from_config(config: &ModelsConfig) -> Self {
        Self {
            default_model: config.default_model.clone(),
            mapping: config.mapping.clone(),
            capabilities: config
                .capabilities
                .iter()
                .map(|(model, caps)| (model.clone(), ModelCapabilities::from(*caps)))
                .collect(),
        }
    }

    /// Map a front identifier to its backend model
    ///
    /// Unknown identifiers resolve to the default backend model. A backend
    /// model without a capability entry gets no capabilities at all.
    pub fn resolve(&self, front_model: &str) -> ResolvedModel {
        let (backend_model, fallback) = match self.mapping.get(front_model) {
            Some(backend) => (backend.clone(), false),
            None => (self.default_model.clone(), true),
        };

        let capabilities = self.capabilities_of(&backend_model);

        ResolvedModel {
            backend_model,
            capabilities,
            fallback,
        }
    }

    /// Capability flags of a backend model
    pub fn capabilities_of(&self, backend_model: &str) -> ModelCapabilities {
        self.capabilities.get(backend_model).copied().unwrap_or_default()
    }

    /// Front identifiers advertised to clients, in configuration order
    pub fn front_models(&self) -> impl Iterator<Item = &str> {
        self.mapping.keys().map(String::as_str)
    }

    /// Backend model used for unknown front identifiers
    pub fn default_model(&self) -> &str {
        &self.default_model
    }
}

impl Default for ModelPolicyTable {
    fn default() -> Self {
        Self::from_config(&ModelsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_maps_to_backend() {
        let table = ModelPolicyTable::default();
        let resolved = table.resolve("gpt-4");

        assert_eq!(resolved.backend_model, "deepseek-chat");
        assert!(!resolved.fallback);
        assert!(resolved.capabilities.supports_tools);
        assert!(!resolved.capabilities.reasoning);
    }

    #[test]
    fn unknown_model_falls_back_to_default() {
        let table = ModelPolicyTable::default();
        let resolved = table.resolve("claude-9");

        assert_eq!(resolved.backend_model, "deepseek-reasoner");
        assert!(resolved.fallback);
        assert!(resolved.capabilities.ignores_sampling_params);
    }

    #[test]
    fn reasoning_aliases_share_capabilities() {
        let table = ModelPolicyTable::default();

        for front in ["o3", "o3-preview", "o3-mini", "o4-mini", "gpt-4o", "deepseek-reasoner"] {
            let resolved = table.resolve(front);
            assert_eq!(resolved.backend_model, "deepseek-reasoner", "{front}");
            assert!(resolved.capabilities.reasoning, "{front}");
        }
    }

    #[test]
    fn front_models_keep_configuration_order() {
        let table = ModelPolicyTable::default();
        let models: Vec<_> = table.front_models().collect();

        assert_eq!(models.first(), Some(&"o3"));
        assert_eq!(models.len(), 10);
    }
}
