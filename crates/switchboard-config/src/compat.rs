use serde::Deserialize;

/// Output-token limits applied to clients identified by user agent
///
/// Some editor integrations request unbounded completions that the backend
/// answers slowly; matching clients get `max_tokens` capped.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompatConfig {
    /// Case-insensitive substrings matched against the `User-Agent` header
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,
    /// Requests above this limit (or without one) are capped
    #[serde(default = "default_threshold")]
    pub max_tokens_threshold: u32,
    /// Value substituted when the cap applies
    #[serde(default = "default_cap")]
    pub max_tokens_cap: u32,
}

impl Default for CompatConfig {
    fn default() -> Self {
        Self {
            user_agents: default_user_agents(),
            max_tokens_threshold: default_threshold(),
            max_tokens_cap: default_cap(),
        }
    }
}

fn default_user_agents() -> Vec<String> {
    vec!["cursor".to_string()]
}

const fn default_threshold() -> u32 {
    2000
}

const fn default_cap() -> u32 {
    1500
}
