use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use axum::Json;
use axum::extract::State;
use serde::Serialize;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Static facts about this process reported by health and status
pub struct ServiceInfo {
    started: Instant,
    backend: String,
    models: Vec<String>,
    health_path: Option<String>,
}

impl ServiceInfo {
    pub fn new(backend: String, models: Vec<String>, health_path: Option<String>) -> Self {
        Self {
            started: Instant::now(),
            backend,
            models,
            health_path,
        }
    }

    fn uptime_seconds(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    uptime_seconds: f64,
    timestamp: u64,
}

#[derive(Serialize)]
pub struct StatusResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: f64,
    supported_models: Vec<String>,
    backend: String,
    timestamp: u64,
}

#[derive(Serialize)]
pub struct IndexResponse {
    service: &'static str,
    version: &'static str,
    status: &'static str,
    endpoints: Vec<String>,
    supported_models: Vec<String>,
}

/// Liveness probe
pub async fn health_handler(State(info): State<Arc<ServiceInfo>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "switchboard",
        version: VERSION,
        uptime_seconds: info.uptime_seconds(),
        timestamp: unix_now(),
    })
}

/// Gateway status: uptime, advertised models and the backend in use
pub async fn status_handler(State(info): State<Arc<ServiceInfo>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "active",
        version: VERSION,
        uptime_seconds: info.uptime_seconds(),
        supported_models: info.models.clone(),
        backend: info.backend.clone(),
        timestamp: unix_now(),
    })
}

/// Landing document listing the served endpoints and models
pub async fn index_handler(State(info): State<Arc<ServiceInfo>>) -> Json<IndexResponse> {
    let mut endpoints = vec![
        "POST /v1/chat/completions".to_owned(),
        "GET /v1/models".to_owned(),
        "GET /v1/status".to_owned(),
    ];
    if let Some(ref path) = info.health_path {
        endpoints.push(format!("GET {path}"));
    }

    Json(IndexResponse {
        service: "switchboard",
        version: VERSION,
        status: "running",
        endpoints,
        supported_models: info.models.clone(),
    })
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
