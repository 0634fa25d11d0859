//! Mock DeepSeek backend for integration tests
//!
//! Serves `/v1/chat/completions` with canned JSON or SSE answers and records
//! what the gateway sent so tests can inspect the translated request.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use bytes::Bytes;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tower_http::compression::CompressionLayer;

/// How the mock answers
#[derive(Clone, Default)]
pub struct MockBehavior {
    /// Reply to every request with this status and body
    pub fail: Option<(StatusCode, String)>,
    /// Raw SSE body for streaming requests; a default stream when `None`
    pub stream_body: Option<String>,
    /// Keep streaming connections open after the body, sending comment
    /// keepalives until the client goes away
    pub hold_stream_open: bool,
    /// Sleep before sending response headers
    pub header_delay: Option<Duration>,
}

/// Mock DeepSeek backend that returns predictable responses
pub struct MockDeepSeek {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    behavior: MockBehavior,
    request_count: AtomicU32,
    last_request: Mutex<Option<serde_json::Value>>,
    last_authorization: Mutex<Option<String>>,
    stream_dropped: AtomicBool,
}

impl MockDeepSeek {
    /// Start the mock server with default behavior
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(MockBehavior::default()).await
    }

    /// Start a mock that answers every request with `status` and `body`
    pub async fn start_failing(status: StatusCode, body: &str) -> anyhow::Result<Self> {
        Self::start_with(MockBehavior {
            fail: Some((status, body.to_owned())),
            ..MockBehavior::default()
        })
        .await
    }

    /// Start the mock server with custom behavior
    pub async fn start_with(behavior: MockBehavior) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            behavior,
            request_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
            last_authorization: Mutex::new(None),
            stream_dropped: AtomicBool::new(false),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .layer(CompressionLayer::new().gzip(true))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for the backend section of the config
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of chat completion requests received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    /// Body of the most recent request as the gateway sent it
    pub fn last_request(&self) -> serde_json::Value {
        self.state
            .last_request
            .lock()
            .unwrap()
            .clone()
            .expect("mock received a request")
    }

    /// `Authorization` header of the most recent request
    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }

    /// Wait until the gateway has closed a held-open stream
    pub async fn wait_for_stream_drop(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if self.state.stream_dropped.load(Ordering::SeqCst) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

impl Drop for MockDeepSeek {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Flags the mock state when the response body is dropped
struct DropFlag(Arc<MockState>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.stream_dropped.store(true, Ordering::SeqCst);
    }
}

async fn handle_chat_completions(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(request): Json<serde_json::Value>,
) -> Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    *state.last_request.lock().unwrap() = Some(request.clone());
    *state.last_authorization.lock().unwrap() = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);

    if let Some(delay) = state.behavior.header_delay {
        tokio::time::sleep(delay).await;
    }

    if let Some((status, body)) = &state.behavior.fail {
        return (*status, body.clone()).into_response();
    }

    let model = request["model"].as_str().unwrap_or("deepseek-chat").to_owned();

    if request["stream"].as_bool().unwrap_or(false) {
        stream_response(&state, &model)
    } else {
        Json(completion(&model)).into_response()
    }
}

fn completion(model: &str) -> serde_json::Value {
    let mut message = serde_json::json!({
        "role": "assistant",
        "content": "Hello from the mock backend",
    });
    if model == "deepseek-reasoner" {
        message["reasoning_content"] = "The user greeted me.".into();
    }

    serde_json::json!({
        "id": "chatcmpl-mock-1",
        "object": "chat.completion",
        "created": 1_735_000_000,
        "model": model,
        "choices": [{"index": 0, "message": message, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 9, "completion_tokens": 6, "total_tokens": 15}
    })
}

/// Three content chunks then the sentinel, all stamped with the backend model
pub fn default_stream(model: &str) -> String {
    let chunk = |delta: &str, finish: &str| {
        format!(
            r#"data: {{"id":"chunk-1","object":"chat.completion.chunk","created":1735000000,"model":"{model}","choices":[{{"index":0,"delta":{delta},"finish_reason":{finish}}}]}}"#
        ) + "\n\n"
    };

    [
        chunk(r#"{"role":"assistant","content":"Hel"}"#, "null"),
        chunk(r#"{"content":"lo"}"#, "null"),
        chunk("{}", r#""stop""#),
        "data: [DONE]\n\n".to_owned(),
    ]
    .concat()
}

fn stream_response(state: &Arc<MockState>, model: &str) -> Response {
    let body = state
        .behavior
        .stream_body
        .clone()
        .unwrap_or_else(|| default_stream(model));

    let flag = DropFlag(Arc::clone(state));
    let frames = futures_util::stream::iter(vec![Ok::<_, Infallible>(Bytes::from(body))]);

    let body = if state.behavior.hold_stream_open {
        let keepalive = futures_util::stream::unfold((), |()| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Some((Ok(Bytes::from_static(b": keepalive\n\n")), ()))
        });
        Body::from_stream(frames.chain(keepalive).map(move |frame| {
            let _flag = &flag;
            frame
        }))
    } else {
        Body::from_stream(frames.map(move |frame| {
            let _flag = &flag;
            frame
        }))
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/event-stream")],
        body,
    )
        .into_response()
}
