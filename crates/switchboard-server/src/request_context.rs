use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request};
use axum::middleware::Next;
use axum::response::Response;
use http::HeaderValue;
use switchboard_core::RequestContext;

/// Middleware that attaches a `RequestContext` and logs the request outcome
///
/// The peer address is taken from `ConnectInfo` when the server was started
/// with connect info, and proxy headers take precedence over it.
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let context = RequestContext::from_headers(request.headers(), peer);
    let request_id = context.request_id.clone();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    tracing::debug!(
        request_id = %request_id,
        client_ip = %context.client_ip,
        user_agent = context.user_agent.as_deref().unwrap_or("-"),
        %method,
        path = %path,
        "request received"
    );

    request.extensions_mut().insert(context);

    let started = Instant::now();
    let mut response = next.run(request).await;

    tracing::info!(
        request_id = %request_id,
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis(),
        "request handled"
    );

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}
