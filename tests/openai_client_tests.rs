//! OpenAI-compatible streaming client against a local mock server.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use futures_util::StreamExt;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chatrelay::{
    ChatMessage, CompletionProvider, Container, ContainerConfig, DomainError, OpenAiClient,
    Router, StreamCompletionUseCase, PROVIDER_ERROR_MESSAGE,
};

fn sse_body(chunks: &[&str]) -> String {
    chunks
        .iter()
        .map(|data| format!("data: {data}\n\n"))
        .collect()
}

fn delta(content: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion.chunk",
        "choices": [{ "index": 0, "delta": { "content": content }, "finish_reason": null }]
    })
    .to_string()
}

async fn mount_stream(server: &MockServer, body: String) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_raw(body, "text/event-stream"),
        )
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new("test-key", "gpt-3.5-turbo", format!("{}/v1", server.uri()))
}

fn conversation() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system("You are a helpful AI assistant."),
        ChatMessage::user("Say hello"),
    ]
}

async fn collect(
    client: &OpenAiClient,
) -> Result<Vec<Result<String, DomainError>>, DomainError> {
    let stream = client.stream_completion(conversation()).await?;
    Ok(stream.collect().await)
}

#[tokio::test]
async fn streams_content_deltas_in_order() {
    let server = MockServer::start().await;
    let role = json!({ "choices": [{ "index": 0, "delta": { "role": "assistant", "content": "" } }] })
        .to_string();
    let stop = json!({ "choices": [{ "index": 0, "delta": {}, "finish_reason": "stop" }] })
        .to_string();
    let body = sse_body(&[&role, &delta("Hel"), &delta("lo"), &delta(" world"), &stop, "[DONE]"]);
    mount_stream(&server, body).await;

    let items = collect(&client_for(&server)).await.unwrap();
    let fragments: Vec<String> = items.into_iter().map(|item| item.unwrap()).collect();

    assert_eq!(fragments, vec!["Hel", "lo", " world"]);
}

#[tokio::test]
async fn sends_streaming_request_with_bearer_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header_matcher("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "stream": true,
            "messages": [
                { "role": "system", "content": "You are a helpful AI assistant." },
                { "role": "user", "content": "Say hello" }
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse_body(&[&delta("ok"), "[DONE]"]), "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let items = collect(&client_for(&server)).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_deref().unwrap(), "ok");
}

#[tokio::test]
async fn stops_reading_at_done_marker() {
    let server = MockServer::start().await;
    let body = sse_body(&[&delta("a"), "[DONE]", &delta("ignored")]);
    mount_stream(&server, body).await;

    let items = collect(&client_for(&server)).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_deref().unwrap(), "a");
}

#[tokio::test]
async fn error_status_is_reported_as_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "error": { "message": "Incorrect API key provided" } })),
        )
        .mount(&server)
        .await;

    let err = match collect(&client_for(&server)).await {
        Err(err) => err,
        Ok(_) => panic!("expected provider error"),
    };
    assert!(err.is_provider_error());
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn malformed_chunk_ends_stream_with_error() {
    let server = MockServer::start().await;
    mount_stream(&server, sse_body(&[&delta("f1"), "{not json"])).await;

    let items = collect(&client_for(&server)).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_deref().unwrap(), "f1");
    assert!(items[1].as_ref().unwrap_err().is_provider_error());
}

#[tokio::test]
async fn unreachable_server_is_provider_error() {
    let client = OpenAiClient::new("test-key", "gpt-3.5-turbo", "http://127.0.0.1:1/v1");
    let err = match client.stream_completion(conversation()).await {
        Err(err) => err,
        Ok(_) => panic!("expected connection failure"),
    };
    assert!(err.is_provider_error());
}

#[tokio::test]
async fn use_case_masks_provider_failure_after_first_fragment() {
    let server = MockServer::start().await;
    mount_stream(&server, sse_body(&[&delta("f1"), "garbage"])).await;

    let use_case = StreamCompletionUseCase::new(Some(Arc::new(client_for(&server))));
    let fragments: Vec<String> = use_case.execute("Say hello").collect().await;

    assert_eq!(fragments, vec!["f1".to_string(), PROVIDER_ERROR_MESSAGE.to_string()]);
}

#[tokio::test]
async fn use_case_masks_error_status_as_single_apology() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let use_case = StreamCompletionUseCase::new(Some(Arc::new(client_for(&server))));
    let fragments: Vec<String> = use_case.execute("Say hello").collect().await;

    assert_eq!(fragments, vec![PROVIDER_ERROR_MESSAGE.to_string()]);
}

#[tokio::test]
async fn use_case_masks_unreachable_server_as_single_apology() {
    let client = OpenAiClient::new("test-key", "gpt-3.5-turbo", "http://127.0.0.1:1/v1");
    let use_case = StreamCompletionUseCase::new(Some(Arc::new(client)));
    let fragments: Vec<String> = use_case.execute("hi").collect().await;

    assert_eq!(fragments, vec![PROVIDER_ERROR_MESSAGE.to_string()]);
}

#[tokio::test]
async fn chat_endpoint_masks_error_status_as_message_event() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let container =
        Container::with_provider(Some(Arc::new(client_for(&server))), ContainerConfig::default());
    let app = Router::new(Arc::new(container)).build();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("message=hi"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();

    let apology = serde_json::to_string(&json!({ "data": PROVIDER_ERROR_MESSAGE })).unwrap();
    assert_eq!(body.matches("data:").count(), 1);
    assert!(body.contains(&apology));
    assert!(!body.contains("event: error") && !body.contains("event:error"));
}

#[tokio::test]
async fn chat_endpoint_relays_provider_stream() {
    let server = MockServer::start().await;
    mount_stream(&server, sse_body(&[&delta("Hi"), &delta(" there"), "[DONE]"])).await;

    let container =
        Container::with_provider(Some(Arc::new(client_for(&server))), ContainerConfig::default());
    let app = Router::new(Arc::new(container)).build();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("message=Say+hello"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();

    let hi = body.find(r#"{"data":"Hi"}"#).expect("first fragment event");
    let there = body.find(r#"{"data":" there"}"#).expect("second fragment event");
    assert!(hi < there);
    assert!(!body.contains("event: error") && !body.contains("event:error"));
}
