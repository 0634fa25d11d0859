use std::time::Duration;

use serde::Deserialize;

/// CORS configuration
///
/// Defaults mirror what browser-based chat clients expect from an
/// OpenAI-compatible endpoint: any origin, `GET`/`POST`/`OPTIONS`, and the
/// headers needed to send a bearer key.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins (wildcard "*" or explicit list)
    #[serde(default)]
    pub origins: AnyOrList,
    /// Allowed HTTP methods
    #[serde(default = "default_methods")]
    pub methods: AnyOrList,
    /// Allowed request headers
    #[serde(default = "default_headers")]
    pub headers: AnyOrList,
    /// Headers exposed to the browser
    #[serde(default = "default_expose_headers")]
    pub expose_headers: Vec<String>,
    /// Allow credentials
    #[serde(default)]
    pub credentials: bool,
    /// Max age for the preflight cache in seconds
    #[serde(default)]
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: AnyOrList::Any,
            methods: default_methods(),
            headers: default_headers(),
            expose_headers: default_expose_headers(),
            credentials: false,
            max_age: None,
        }
    }
}

impl CorsConfig {
    /// Get max age as Duration
    pub fn max_age_duration(&self) -> Option<Duration> {
        self.max_age.map(Duration::from_secs)
    }
}

/// Either a wildcard "*" or an explicit list of values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnyOrList {
    /// Match any value
    #[default]
    Any,
    /// Explicit list
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for AnyOrList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }

        let values = match Raw::deserialize(deserializer)? {
            Raw::One(value) => vec![value],
            Raw::Many(values) => values,
        };

        if values.iter().any(|v| v == "*") {
            Ok(Self::Any)
        } else {
            Ok(Self::List(values))
        }
    }
}

fn default_methods() -> AnyOrList {
    AnyOrList::List(vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()])
}

fn default_headers() -> AnyOrList {
    AnyOrList::List(
        ["origin", "content-type", "accept", "authorization"]
            .into_iter()
            .map(str::to_string)
            .collect(),
    )
}

fn default_expose_headers() -> Vec<String> {
    vec!["content-length".to_string()]
}
