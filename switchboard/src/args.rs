use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Switchboard gateway
#[derive(Debug, Parser)]
#[command(
    name = "switchboard",
    version,
    about = "OpenAI-compatible gateway in front of DeepSeek-style backends"
)]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "switchboard.toml", env = "SWITCHBOARD_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "SWITCHBOARD_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Override only the listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Log filter directive, e.g. `info` or `switchboard_llm=debug,info`
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Shorthand for `--log-level debug`
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Effective listen address after applying `--listen` and `--port`
    pub fn listen_address(&self, configured: SocketAddr) -> SocketAddr {
        let mut address = self.listen.unwrap_or(configured);
        if let Some(port) = self.port {
            address.set_port(port);
        }
        address
    }

    /// Effective log filter
    pub fn log_filter(&self) -> &str {
        if self.debug { "debug" } else { &self.log_level }
    }
}
