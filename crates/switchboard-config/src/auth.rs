use secrecy::SecretString;
use serde::Deserialize;

/// Bearer-key authentication for inbound clients
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Whether inbound requests must present a bearer key
    #[serde(default)]
    pub enabled: bool,

    /// Accepted client keys; when empty the backend API key is accepted instead
    #[serde(default)]
    pub api_keys: Vec<SecretString>,

    /// Paths that skip authentication
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_public_paths() -> Vec<String> {
    vec!["/health".to_string()]
}
