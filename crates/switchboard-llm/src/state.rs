//! Request-scoped orchestration over the shared, read-only engine state

use std::sync::Arc;

use bytes::Bytes;
use switchboard_config::{CompatConfig, Config, ReasoningMode};
use switchboard_core::RequestContext;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::LlmError;
use crate::policy::{ModelCapabilities, ModelPolicyTable};
use crate::protocol::deepseek::DeepSeekRequest;
use crate::protocol::openai::{OpenAiRequest, OpenAiResponse};
use crate::relay::{self, RelayOutcome};
use crate::transport::{Backend, BackendByteStream, HttpBackend};
use crate::translate::{self, TranslatedRequest};

/// Entry point of the engine, cheap to clone and shared by all handlers
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    backend: Arc<dyn Backend>,
    policy: ModelPolicyTable,
    reasoning: ReasoningMode,
    compat: Option<CompatConfig>,
}

/// A backend stream that has answered 2xx but not been relayed yet
pub struct OpenStream {
    upstream: BackendByteStream,
    requested_model: String,
    request_id: String,
}

impl Gateway {
    /// Build the gateway and its HTTP transport from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let backend = HttpBackend::new(&config.backend)?;

        Ok(Self::new(
            Arc::new(backend),
            ModelPolicyTable::from_config(&config.models),
            config.reasoning.mode,
            config.server.compat.clone(),
        ))
    }

    /// Assemble a gateway around any backend
    pub fn new(
        backend: Arc<dyn Backend>,
        policy: ModelPolicyTable,
        reasoning: ReasoningMode,
        compat: Option<CompatConfig>,
    ) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                backend,
                policy,
                reasoning,
                compat,
            }),
        }
    }

    pub fn policy(&self) -> &ModelPolicyTable {
        &self.inner.policy
    }

    /// Whether the compatibility profile applies to this client
    pub fn is_compat_client(&self, context: &RequestContext) -> bool {
        self.inner
            .compat
            .as_ref()
            .is_some_and(|compat| context.user_agent_matches(&compat.user_agents))
    }

    /// Serve a request synchronously
    pub async fn complete(&self, front: OpenAiRequest, context: &RequestContext) -> Result<OpenAiResponse, LlmError> {
        let requested_model = front.model.clone();
        let (request, capabilities) = self.prepare(front, false, context);

        let response = self.inner.backend.complete(&request).await?;

        tracing::debug!(
            request_id = %context.request_id,
            backend_model = %response.model,
            choices = response.choices.len(),
            "backend response received"
        );

        Ok(translate::translate_response(
            response,
            &requested_model,
            capabilities,
            self.inner.reasoning,
        ))
    }

    /// Open a streaming call; the backend has accepted it once this returns
    pub async fn open_stream(&self, front: OpenAiRequest, context: &RequestContext) -> Result<OpenStream, LlmError> {
        let requested_model = front.model.clone();
        let (request, _) = self.prepare(front, true, context);

        let upstream = self.inner.backend.complete_stream(&request).await?;

        Ok(OpenStream {
            upstream,
            requested_model,
            request_id: context.request_id.clone(),
        })
    }

    /// Translate, apply the compatibility profile and log every degradation
    fn prepare(
        &self,
        front: OpenAiRequest,
        stream: bool,
        context: &RequestContext,
    ) -> (DeepSeekRequest, ModelCapabilities) {
        let requested_model = front.model.clone();

        let TranslatedRequest {
            mut request,
            capabilities,
            mut degradations,
        } = translate::translate_request(front, &self.inner.policy);
        request.stream = stream;

        if let Some(compat) = &self.inner.compat
            && context.user_agent_matches(&compat.user_agents)
        {
            degradations.extend(translate::apply_max_tokens_cap(&mut request, compat));
        }

        for degradation in &degradations {
            tracing::warn!(request_id = %context.request_id, model = %requested_model, "{degradation}");
        }

        tracing::info!(
            request_id = %context.request_id,
            model = %requested_model,
            backend_model = %request.model,
            stream,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "forwarding chat completion"
        );

        (request, capabilities)
    }
}

impl OpenStream {
    /// Client-facing model name stamped on every relayed chunk
    pub fn requested_model(&self) -> &str {
        &self.requested_model
    }

    /// Relay the stream frame by frame into `sink` until it ends or `cancel` fires
    pub async fn relay(self, sink: mpsc::Sender<Bytes>, cancel: &CancellationToken) -> RelayOutcome {
        let outcome = relay::relay(self.upstream, &self.requested_model, sink, cancel).await;

        match outcome {
            RelayOutcome::Done => {
                tracing::info!(request_id = %self.request_id, model = %self.requested_model, "stream completed");
            }
            RelayOutcome::Cancelled => {
                tracing::info!(request_id = %self.request_id, "client disconnected, stream cancelled");
            }
            RelayOutcome::UpstreamClosed | RelayOutcome::UpstreamFailed => {
                tracing::warn!(request_id = %self.request_id, outcome = ?outcome, "stream ended early");
            }
        }

        outcome
    }
}
