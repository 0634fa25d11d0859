//! Axum route handlers for the OpenAI-compatible endpoints

use std::convert::Infallible;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json, Router, routing};
use futures_util::StreamExt;
use switchboard_core::{HttpError, RequestContext};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::error::LlmError;
use crate::protocol::openai::{OpenAiModel, OpenAiModelList, OpenAiRequest};
use crate::state::Gateway;

/// Frames buffered between the relay task and the response body
const FRAME_BUFFER: usize = 1;

/// Build the router for `/v1/chat/completions` and `/v1/models`
pub fn llm_router(gateway: Gateway) -> Router {
    Router::new()
        .route("/v1/chat/completions", routing::post(chat_completions))
        .route("/v1/models", routing::get(list_models))
        .with_state(gateway)
}

/// Handle `POST /v1/chat/completions`
async fn chat_completions(
    State(gateway): State<Gateway>,
    Extension(context): Extension<RequestContext>,
    payload: Result<Json<OpenAiRequest>, JsonRejection>,
) -> Response {
    let compat = gateway.is_compat_client(&context);

    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!(request_id = %context.request_id, error = %rejection.body_text(), "rejected request body");
            return error_response(&LlmError::InvalidRequest(rejection.body_text()), compat);
        }
    };

    if request.stream {
        match gateway.open_stream(request, &context).await {
            Ok(stream) => stream_response(stream),
            Err(e) => error_response(&e, compat),
        }
    } else {
        match gateway.complete(request, &context).await {
            Ok(response) => Json(response).into_response(),
            Err(e) => error_response(&e, compat),
        }
    }
}

/// Handle `GET /v1/models`
async fn list_models(State(gateway): State<Gateway>) -> Json<OpenAiModelList> {
    let created = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs());

    let data = gateway
        .policy()
        .front_models()
        .map(|id| OpenAiModel {
            id: id.to_owned(),
            object: "model".to_owned(),
            created,
            owned_by: "switchboard".to_owned(),
        })
        .collect();

    Json(OpenAiModelList {
        object: "list".to_owned(),
        data,
    })
}

/// Spawn the relay and expose its frames as a `text/event-stream` body
///
/// The body owns a drop guard on the relay's token, so a client disconnect
/// (which drops the body) cancels the relay and closes the backend stream.
fn stream_response(stream: crate::state::OpenStream) -> Response {
    let (tx, rx) = mpsc::channel(FRAME_BUFFER);
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();

    tokio::spawn(async move {
        stream.relay(tx, &cancel).await;
    });

    let body = ReceiverStream::new(rx).map(move |frame| {
        let _guard = &guard;
        Ok::<_, Infallible>(frame)
    });

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream")),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            (
                header::HeaderName::from_static("x-accel-buffering"),
                HeaderValue::from_static("no"),
            ),
        ],
        Body::from_stream(body),
    )
        .into_response()
}

/// Render an error as an OpenAI error body
///
/// Clients matched by the compatibility profile always get a 503
/// `service_unavailable` body, which they treat as retryable.
fn error_response(error: &LlmError, compat: bool) -> Response {
    if compat {
        let body = serde_json::json!({
            "error": {
                "message": "service temporarily unavailable, please retry",
                "type": "service_unavailable",
                "code": "503",
            }
        });
        return (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
    }

    let body = serde_json::json!({
        "error": {
            "message": error.client_message(),
            "type": error.error_type(),
            "code": serde_json::Value::Null,
        }
    });

    (error.status_code(), Json(body)).into_response()
}
