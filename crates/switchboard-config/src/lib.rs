#![allow(clippy::must_use_candidate)]

pub mod auth;
pub mod backend;
pub mod compat;
pub mod cors;
mod duration;
mod env;
pub mod health;
mod loader;
pub mod models;
pub mod reasoning;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use auth::*;
pub use backend::*;
pub use compat::*;
pub use cors::*;
pub use health::*;
pub use models::*;
pub use reasoning::*;
pub use server::*;
pub use telemetry::TelemetryConfig;

/// Top-level Switchboard configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Inbound HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream inference backend
    #[serde(default)]
    pub backend: BackendConfig,
    /// Front-to-back model mapping and per-model capabilities
    #[serde(default)]
    pub models: ModelsConfig,
    /// How reasoning traces are surfaced to clients
    #[serde(default)]
    pub reasoning: ReasoningConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
