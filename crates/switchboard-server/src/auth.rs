use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use switchboard_config::{AuthConfig, CompatConfig};
use switchboard_core::RequestContext;

/// Keys and bypass rules for inbound bearer authentication
#[derive(Clone)]
pub struct AuthState {
    keys: Arc<[SecretString]>,
    public_paths: Arc<[String]>,
    compat_agents: Arc<[String]>,
}

impl AuthState {
    /// Accept the configured client keys, or the backend key when none are listed
    ///
    /// The served health path is always public, wherever it is mounted.
    pub fn new(
        config: &AuthConfig,
        backend_key: Option<&SecretString>,
        compat: Option<&CompatConfig>,
        health_path: Option<&str>,
    ) -> Self {
        let keys: Vec<SecretString> = if config.api_keys.is_empty() {
            backend_key.cloned().into_iter().collect()
        } else {
            config.api_keys.clone()
        };

        let mut public_paths = config.public_paths.clone();
        if let Some(path) = health_path
            && !public_paths.iter().any(|p| p == path)
        {
            public_paths.push(path.to_owned());
        }

        Self {
            keys: keys.into(),
            public_paths: public_paths.into(),
            compat_agents: compat.map(|c| c.user_agents.clone()).unwrap_or_default().into(),
        }
    }

    fn accepts(&self, token: &str) -> bool {
        self.keys.iter().any(|key| key.expose_secret() == token)
    }
}

/// Require `Authorization: Bearer <key>` on every non-public path
pub async fn auth_middleware(state: AuthState, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();

    if state.public_paths.iter().any(|p| path.starts_with(p.as_str())) {
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    let verdict = match token {
        None => Err("missing or malformed Authorization header"),
        Some(token) if state.accepts(token) => Ok(()),
        Some(_) => Err("invalid API key"),
    };

    let Err(message) = verdict else {
        return next.run(request).await;
    };

    let context = request.extensions().get::<RequestContext>();
    let request_id = context.map_or("-", |c| c.request_id.as_str());
    tracing::warn!(request_id, path = %path, "{message}");

    if context.is_some_and(|c| c.user_agent_matches(&state.compat_agents)) {
        return service_unavailable();
    }

    let body = serde_json::json!({
        "error": {
            "message": message,
            "type": "authentication_error",
            "code": "invalid_api_key",
        }
    });

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

fn service_unavailable() -> Response {
    let body = serde_json::json!({
        "error": {
            "message": "service temporarily unavailable, please retry",
            "type": "service_unavailable",
            "code": "503",
        }
    });

    (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
}
