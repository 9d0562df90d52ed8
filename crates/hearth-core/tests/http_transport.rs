//! HTTP transport against a local OpenAI-compatible stub

mod common;

use common::{StubServer, completion, json_response, sse_response};
use futures::StreamExt;
use hearth_core::llm::{ChatMessage, ChatRequest};
use hearth_core::{ChatTransport, HearthError, HttpTransport, ProviderConfig};

fn chat() -> ChatRequest {
    ChatRequest::new(vec![ChatMessage::user("Bonjour")], 0.7, 128)
}

#[tokio::test]
async fn test_complete_returns_message_content() {
    let server = StubServer::start(vec![completion("Bonjour !")]).await;
    let provider =
        ProviderConfig::new("local", server.base_url.clone(), "llama3").with_credential("sk-test-key");
    let transport = HttpTransport::new().unwrap();

    let text = transport.complete(&provider, &chat()).await.unwrap();

    assert_eq!(text, "Bonjour !");
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let raw = requests[0].to_lowercase();
    assert!(raw.starts_with("post /v1/chat/completions"));
    assert!(raw.contains("authorization: bearer sk-test-key"));
    assert!(requests[0].contains("\"model\":\"llama3\""));
    assert!(!requests[0].contains("\"stream\""));
}

#[tokio::test]
async fn test_error_status_is_upstream_error() {
    let server = StubServer::start(vec![json_response(
        "503 Service Unavailable",
        r#"{"error":"overloaded"}"#,
    )])
    .await;
    let provider = ProviderConfig::new("local", server.base_url.clone(), "llama3");

    let err = HttpTransport::new()
        .unwrap()
        .complete(&provider, &chat())
        .await
        .unwrap_err();

    match &err {
        HearthError::Upstream {
            provider,
            status_code,
            message,
        } => {
            assert_eq!(provider, "local");
            assert_eq!(*status_code, Some(503));
            assert!(message.contains("overloaded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_missing_content_is_upstream_error() {
    let server = StubServer::start(vec![json_response("200 OK", r#"{"choices":[]}"#)]).await;
    let provider = ProviderConfig::new("local", server.base_url.clone(), "llama3");

    let err = HttpTransport::new()
        .unwrap()
        .complete(&provider, &chat())
        .await
        .unwrap_err();
    assert!(matches!(err, HearthError::Upstream { .. }));
}

#[tokio::test]
async fn test_stream_yields_deltas() {
    let server = StubServer::start(vec![sse_response(&["Bon", "jour", " !"])]).await;
    let provider = ProviderConfig::new("local", server.base_url.clone(), "llama3");

    let stream = HttpTransport::new()
        .unwrap()
        .stream(&provider, &chat())
        .await
        .unwrap();
    let chunks: Vec<String> = stream.map(|chunk| chunk.unwrap()).collect().await;

    assert_eq!(chunks.concat(), "Bonjour !");
    assert!(server.requests()[0].contains("\"stream\":true"));
}

#[tokio::test]
async fn test_unreachable_provider() {
    let provider = ProviderConfig::new("gone", "http://127.0.0.1:9/v1", "llama3");
    let err = HttpTransport::new()
        .unwrap()
        .complete(&provider, &chat())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "HEARTH_UPSTREAM");
}
