use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Upstream inference backend speaking the DeepSeek chat completion API
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Base URL of the backend API
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// API key sent as a bearer token
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Path appended to `base_url` for chat completions
    #[serde(default = "default_completions_path")]
    pub completions_path: String,
    /// `User-Agent` sent upstream
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// End-to-end timeout for non-streaming calls
    #[serde(default = "default_request_timeout", with = "crate::duration")]
    pub request_timeout: Duration,
    /// TCP/TLS connect timeout for both paths
    #[serde(default = "default_connect_timeout", with = "crate::duration")]
    pub connect_timeout: Duration,
    /// Time allowed for response headers on the streaming path
    #[serde(default = "default_header_timeout", with = "crate::duration")]
    pub header_timeout: Duration,
    /// How long idle pooled connections are kept
    #[serde(default = "default_pool_idle_timeout", with = "crate::duration")]
    pub pool_idle_timeout: Duration,
    /// Maximum idle pooled connections per host
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            completions_path: default_completions_path(),
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            header_timeout: default_header_timeout(),
            pool_idle_timeout: default_pool_idle_timeout(),
            pool_max_idle_per_host: default_pool_max_idle(),
        }
    }
}

impl BackendConfig {
    /// Full URL of the chat completions endpoint
    pub fn completions_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = self.completions_path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

fn default_base_url() -> Url {
    Url::parse("https://api.deepseek.com").expect("valid default URL")
}

fn default_completions_path() -> String {
    "/v1/chat/completions".to_string()
}

fn default_user_agent() -> String {
    concat!("switchboard/", env!("CARGO_PKG_VERSION")).to_string()
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

const fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

const fn default_header_timeout() -> Duration {
    Duration::from_secs(30)
}

const fn default_pool_idle_timeout() -> Duration {
    Duration::from_secs(90)
}

const fn default_pool_max_idle() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completions_url_joins_without_double_slash() {
        let config: BackendConfig = toml::from_str(r#"base_url = "http://127.0.0.1:8080/""#).unwrap();
        assert_eq!(config.completions_url(), "http://127.0.0.1:8080/v1/chat/completions");
    }

    #[test]
    fn durations_parse_from_strings() {
        let config: BackendConfig = toml::from_str(
            r#"
            request_timeout = "2m"
            header_timeout = "5s"
            "#,
        )
        .unwrap();

        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.header_timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn invalid_duration_is_rejected() {
        let err = toml::from_str::<BackendConfig>(r#"request_timeout = "soon""#).unwrap_err();
        assert!(err.to_string().contains("invalid duration"));
    }
}
