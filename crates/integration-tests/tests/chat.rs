//! Synchronous chat completions through the gateway against a mock backend

mod harness;

use axum::http::StatusCode;
use harness::config::{BACKEND_KEY, ConfigBuilder};
use harness::mock_deepseek::MockDeepSeek;
use harness::server::TestServer;
use serde_json::json;
use switchboard_config::ReasoningMode;

async fn setup(builder: impl FnOnce(ConfigBuilder) -> ConfigBuilder) -> (MockDeepSeek, TestServer) {
    let mock = MockDeepSeek::start().await.unwrap();
    let config = builder(ConfigBuilder::new(&mock.base_url())).build();
    let server = TestServer::start(config).await.unwrap();
    (mock, server)
}

fn hello(model: &str) -> serde_json::Value {
    json!({
        "model": model,
        "messages": [{"role": "user", "content": "hello"}]
    })
}

#[tokio::test]
async fn maps_model_both_ways() {
    let (mock, server) = setup(|b| b).await;

    let response = server.chat(&hello("gpt-4")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["model"], "gpt-4");
    assert_eq!(body["object"], "chat.completion");
    assert_eq!(body["choices"][0]["message"]["content"], "Hello from the mock backend");
    assert_eq!(body["usage"]["total_tokens"], 15);

    let sent = mock.last_request();
    assert_eq!(sent["model"], "deepseek-chat");
    assert_eq!(sent["stream"], false);
    assert_eq!(
        mock.last_authorization().as_deref(),
        Some(format!("Bearer {BACKEND_KEY}").as_str())
    );
}

#[tokio::test]
async fn default_temperature_for_chat_models() {
    let (mock, server) = setup(|b| b).await;

    server.chat(&hello("gpt-3.5-turbo")).await;
    assert_eq!(mock.last_request()["temperature"], 0.7);

    let mut request = hello("gpt-3.5-turbo");
    request["temperature"] = json!(0.2);
    server.chat(&request).await;
    assert_eq!(mock.last_request()["temperature"], 0.2);
}

#[tokio::test]
async fn reasoning_model_never_receives_temperature() {
    let (mock, server) = setup(|b| b).await;

    let mut request = hello("o3");
    request["temperature"] = json!(1.3);
    let response = server.chat(&request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let sent = mock.last_request();
    assert_eq!(sent["model"], "deepseek-reasoner");
    assert!(sent.get("temperature").is_none(), "temperature leaked: {sent}");
}

#[tokio::test]
async fn reasoning_trace_separate_by_default() {
    let (_mock, server) = setup(|b| b).await;

    let body: serde_json::Value = server.chat(&hello("o3-mini")).await.json().await.unwrap();

    let message = &body["choices"][0]["message"];
    assert_eq!(body["model"], "o3-mini");
    assert_eq!(message["content"], "Hello from the mock backend");
    assert_eq!(message["reasoning_content"], "The user greeted me.");
}

#[tokio::test]
async fn reasoning_trace_merged_into_content() {
    let (_mock, server) = setup(|b| b.with_reasoning(ReasoningMode::Merged)).await;

    let body: serde_json::Value = server.chat(&hello("o3-mini")).await.json().await.unwrap();

    let message = &body["choices"][0]["message"];
    assert_eq!(message["content"], "The user greeted me.\n\nHello from the mock backend");
    assert!(message.get("reasoning_content").is_none());
}

#[tokio::test]
async fn unknown_model_falls_back_to_default() {
    let (mock, server) = setup(|b| b).await;

    let response = server.chat(&hello("claude-something")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["model"], "claude-something");
    assert_eq!(mock.last_request()["model"], "deepseek-reasoner");
}

#[tokio::test]
async fn tool_choice_object_downgraded_to_auto() {
    let (mock, server) = setup(|b| b).await;

    let request = json!({
        "model": "gpt-4",
        "messages": [{"role": "user", "content": "weather?"}],
        "tools": [{
            "type": "function",
            "function": {"name": "get_weather", "parameters": {"type": "object"}}
        }],
        "tool_choice": {"type": "function", "function": {"name": "get_weather"}}
    });
    let response = server.chat(&request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let sent = mock.last_request();
    assert_eq!(sent["tool_choice"], "auto");
    assert_eq!(sent["tools"][0]["function"]["name"], "get_weather");
}

#[tokio::test]
async fn legacy_functions_become_tools() {
    let (mock, server) = setup(|b| b).await;

    let request = json!({
        "model": "gpt-4",
        "messages": [{"role": "user", "content": "weather?"}],
        "functions": [{"name": "get_weather"}]
    });
    server.chat(&request).await;

    let sent = mock.last_request();
    assert_eq!(sent["tools"][0]["type"], "function");
    assert_eq!(sent["tools"][0]["function"]["name"], "get_weather");
    assert_eq!(sent["tool_choice"], "auto");
}

#[tokio::test]
async fn content_parts_joined() {
    let (mock, server) = setup(|b| b).await;

    let request = json!({
        "model": "gpt-4",
        "messages": [{
            "role": "user",
            "content": [{"type": "text", "text": "one "}, {"type": "text", "text": "two"}]
        }]
    });
    server.chat(&request).await;

    assert_eq!(mock.last_request()["messages"][0]["content"], "one two");
}

#[tokio::test]
async fn malformed_body_is_invalid_request() {
    let (mock, server) = setup(|b| b).await;

    let response = server
        .client()
        .post(server.url("/v1/chat/completions"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn unknown_role_is_invalid_request() {
    let (mock, server) = setup(|b| b).await;

    let request = json!({
        "model": "gpt-4",
        "messages": [{"role": "narrator", "content": "once upon a time"}]
    });
    let response = server.chat(&request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn backend_rejection_is_bad_gateway() {
    let mock = MockDeepSeek::start_failing(StatusCode::UNAUTHORIZED, r#"{"error":"bad key"}"#)
        .await
        .unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.base_url()).build())
        .await
        .unwrap();

    let response = server.chat(&hello("gpt-4")).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], "upstream_error");
}

#[tokio::test]
async fn backend_garbage_is_payload_error() {
    let mock = MockDeepSeek::start_failing(StatusCode::OK, "definitely not json")
        .await
        .unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.base_url()).build())
        .await
        .unwrap();

    let response = server.chat(&hello("gpt-4")).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], "upstream_payload_error");
}

#[tokio::test]
async fn compat_client_capped_and_shielded() {
    let (mock, server) = setup(ConfigBuilder::with_compat).await;

    let response = server
        .client()
        .post(server.url("/v1/chat/completions"))
        .header("user-agent", "Cursor/1.2")
        .json(&hello("gpt-4"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(mock.last_request()["max_tokens"], 1500);

    let mut request = hello("gpt-4");
    request["max_tokens"] = json!(800);
    server
        .client()
        .post(server.url("/v1/chat/completions"))
        .header("user-agent", "Cursor/1.2")
        .json(&request)
        .send()
        .await
        .unwrap();
    assert_eq!(mock.last_request()["max_tokens"], 800);

    // other clients are untouched
    server.chat(&hello("gpt-4")).await;
    assert!(mock.last_request().get("max_tokens").is_none());
}

#[tokio::test]
async fn compat_client_sees_503_on_backend_failure() {
    let mock = MockDeepSeek::start_failing(StatusCode::INTERNAL_SERVER_ERROR, "boom")
        .await
        .unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).with_compat().build();
    let server = TestServer::start(config).await.unwrap();

    let response = server
        .client()
        .post(server.url("/v1/chat/completions"))
        .header("user-agent", "cursor")
        .json(&hello("gpt-4"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], "service_unavailable");
}

#[tokio::test]
async fn unreachable_backend_is_bad_gateway() {
    // Grab a free port, then release it so nothing listens there
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = ConfigBuilder::new(&format!("http://127.0.0.1:{port}")).build();
    let server = TestServer::start(config).await.unwrap();

    let response = server.chat(&hello("gpt-4")).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], "upstream_unavailable");
}
