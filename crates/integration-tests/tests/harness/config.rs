//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::time::Duration;

use secrecy::SecretString;
use switchboard_config::{
    AuthConfig, BackendConfig, CompatConfig, Config, CorsConfig, ReasoningMode, ServerConfig,
};

/// API key the mock backend expects
pub const BACKEND_KEY: &str = "sk-mock-backend";

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Minimal config pointed at the given backend base URL
    pub fn new(backend_url: &str) -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    ..ServerConfig::default()
                },
                backend: BackendConfig {
                    base_url: backend_url.parse().expect("valid URL"),
                    api_key: Some(SecretString::from(BACKEND_KEY)),
                    ..BackendConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Require bearer auth with the given client keys (empty = backend key)
    pub fn with_auth(mut self, keys: &[&str]) -> Self {
        self.config.server.auth = Some(AuthConfig {
            enabled: true,
            api_keys: keys.iter().map(|k| SecretString::from(*k)).collect(),
            public_paths: vec!["/health".to_owned()],
        });
        self
    }

    /// Enable the client compatibility profile with its defaults
    pub fn with_compat(mut self) -> Self {
        self.config.server.compat = Some(CompatConfig::default());
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = Some(config);
        self
    }

    /// Choose how reasoning traces reach clients
    pub fn with_reasoning(mut self, mode: ReasoningMode) -> Self {
        self.config.reasoning.mode = mode;
        self
    }

    /// Bound the wait for response headers on streaming calls
    pub fn with_header_timeout(mut self, timeout: Duration) -> Self {
        self.config.backend.header_timeout = timeout;
        self
    }

    /// Bound the whole synchronous call
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.backend.request_timeout = timeout;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build and validate the final config
    pub fn build(self) -> Config {
        self.config.validate().expect("valid test config");
        self.config
    }
}
