use std::net::SocketAddr;

use serde::Deserialize;

use crate::{auth::AuthConfig, compat::CompatConfig, cors::CorsConfig, health::HealthConfig};

/// Default port, matching the port the gateway has always listened on
pub const DEFAULT_PORT: u16 = 9000;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub cors: Option<CorsConfig>,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    #[serde(default)]
    pub compat: Option<CompatConfig>,
}

impl ServerConfig {
    /// Listen address, defaulting to all interfaces on [`DEFAULT_PORT`]
    pub fn listen_address(&self) -> SocketAddr {
        self.listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))
    }
}
