//! HTTP transport to the DeepSeek-compatible backend

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use http::header::{ACCEPT, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use switchboard_config::BackendConfig;

use crate::error::LlmError;
use crate::protocol::deepseek::{DeepSeekRequest, DeepSeekResponse};

/// Live, unconsumed body of a streaming backend response
pub type BackendByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, LlmError>> + Send>>;

/// Anything that can answer backend-shaped chat completion requests
#[async_trait]
pub trait Backend: Send + Sync {
    /// Send a non-streaming request and decode the full response
    async fn complete(&self, request: &DeepSeekRequest) -> Result<DeepSeekResponse, LlmError>;

    /// Send a streaming request and hand back the raw event stream
    async fn complete_stream(&self, request: &DeepSeekRequest) -> Result<BackendByteStream, LlmError>;
}

/// Backend reached over HTTP(S) through one pooled client
pub struct HttpBackend {
    client: Client,
    completions_url: String,
    api_key: Option<SecretString>,
    request_timeout: Duration,
    header_timeout: Duration,
}

impl HttpBackend {
    /// Build the transport and its connection pool from configuration
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Internal` if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .build()
            .map_err(|e| LlmError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            completions_url: config.completions_url(),
            api_key: config.api_key.clone(),
            request_timeout: config.request_timeout,
            header_timeout: config.header_timeout,
        })
    }

    fn post(&self, request: &DeepSeekRequest, accept: &'static str) -> RequestBuilder {
        let builder = self
            .client
            .post(&self.completions_url)
            .header(ACCEPT, HeaderValue::from_static(accept))
            .json(request);

        match &self.api_key {
            Some(key) => builder.bearer_auth(key.expose_secret()),
            None => builder,
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn complete(&self, request: &DeepSeekRequest) -> Result<DeepSeekResponse, LlmError> {
        let response = self
            .post(request, "application/json")
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(model = %request.model, error = %e, "backend request failed");
                LlmError::from_transport(&e)
            })?;

        let response = ensure_success(response).await?;

        let body = response.bytes().await.map_err(|e| LlmError::from_transport(&e))?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(model = %request.model, error = %e, "backend returned undecodable body");
            LlmError::MalformedBackendPayload(e.to_string())
        })
    }

    async fn complete_stream(&self, request: &DeepSeekRequest) -> Result<BackendByteStream, LlmError> {
        // No overall timeout here: the stream lives as long as generation does
        let response = tokio::time::timeout(self.header_timeout, self.post(request, "text/event-stream").send())
            .await
            .map_err(|_| {
                tracing::error!(model = %request.model, timeout = ?self.header_timeout, "backend sent no response headers");
                LlmError::BackendTimeout(format!("no response headers within {:?}", self.header_timeout))
            })?
            .map_err(|e| {
                tracing::error!(model = %request.model, error = %e, "backend stream request failed");
                LlmError::from_transport(&e)
            })?;

        let response = ensure_success(response).await?;

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| LlmError::from_transport(&e)));

        Ok(Box::pin(stream))
    }
}

/// Turn a non-2xx answer into `BackendRejected`, keeping its body for the client
async fn ensure_success(response: Response) -> Result<Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = %status, "backend returned error");

    Err(LlmError::BackendRejected { status, body })
}
