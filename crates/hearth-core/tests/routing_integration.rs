//! Router, circuit breakers and HTTP transport working together

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{StubServer, completion, json_response, sse_response};
use futures::StreamExt;
use hearth_core::{
    CircuitBreakerConfig, CircuitRegistry, CircuitState, CircuitTransport, HearthError,
    HttpTransport, ProviderConfig, RouteRequest, Router,
};

#[tokio::test]
async fn test_fallback_over_http() {
    let failing = StubServer::start(vec![json_response("500 Internal Server Error", "{}")]).await;
    let healthy = StubServer::start(vec![completion("Voici votre liste")]).await;

    let router = Router::new(Arc::new(HttpTransport::new().unwrap()));
    router.register(ProviderConfig::new("primary", failing.base_url.clone(), "m").with_priority(1));
    router.register(ProviderConfig::new("backup", healthy.base_url.clone(), "m").with_priority(2));

    let text = router.call(&RouteRequest::new("Bonjour")).await.unwrap();

    assert_eq!(text, "Voici votre liste");
    assert_eq!(failing.requests().len(), 1);
    assert_eq!(router.health("primary").unwrap().consecutive_errors, 1);
    assert_eq!(router.health("backup").unwrap().samples, 1);
}

#[tokio::test]
async fn test_exhaustion_over_http_lists_status_codes() {
    let first = StubServer::start(vec![json_response("502 Bad Gateway", "{}")]).await;
    let second = StubServer::start(vec![json_response("429 Too Many Requests", "{}")]).await;

    let router = Router::new(Arc::new(HttpTransport::new().unwrap()));
    router.register(ProviderConfig::new("a", first.base_url.clone(), "m").with_priority(1));
    router.register(ProviderConfig::new("b", second.base_url.clone(), "m").with_priority(2));

    let err = router.call(&RouteRequest::new("Bonjour")).await.unwrap_err();

    let attempts = err.attempts();
    assert_eq!(attempts.len(), 2);
    assert!(attempts[0].error.contains("502"));
    assert!(attempts[1].error.contains("429"));
}

#[tokio::test]
async fn test_open_circuit_skips_network() {
    let failing = StubServer::start(vec![json_response("500 Internal Server Error", "{}")]).await;
    let healthy = StubServer::start(vec![completion("un"), completion("deux")]).await;

    let registry = Arc::new(CircuitRegistry::with_config(CircuitBreakerConfig::new(
        1,
        Duration::from_secs(60),
    )));
    let transport = CircuitTransport::new(HttpTransport::new().unwrap(), registry.clone());
    let router = Router::new(Arc::new(transport));
    router.register(ProviderConfig::new("flaky", failing.base_url.clone(), "m").with_priority(1));
    router.register(ProviderConfig::new("steady", healthy.base_url.clone(), "m").with_priority(2));

    assert_eq!(router.call(&RouteRequest::new("x")).await.unwrap(), "un");
    assert_eq!(registry.get("flaky").state(), CircuitState::Open);

    // Still first in order, but the breaker rejects without a request.
    assert_eq!(router.call(&RouteRequest::new("x")).await.unwrap(), "deux");
    assert_eq!(failing.requests().len(), 1);
}

#[tokio::test]
async fn test_open_circuit_error_in_attempts() {
    let registry = Arc::new(CircuitRegistry::with_config(CircuitBreakerConfig::new(
        1,
        Duration::from_secs(60),
    )));
    registry.get("only").trip();
    let transport = CircuitTransport::new(HttpTransport::new().unwrap(), registry);
    let router = Router::new(Arc::new(transport));
    router.register(ProviderConfig::new("only", "http://127.0.0.1:9/v1", "m"));

    let err = router.call(&RouteRequest::new("x")).await.unwrap_err();
    assert!(matches!(err, HearthError::AllProvidersExhausted { .. }));
    assert!(err.attempts()[0].error.contains("circuit 'only' is open"));
}

#[tokio::test]
async fn test_streaming_over_http() {
    let server = StubServer::start(vec![sse_response(&["Il fera ", "beau"])]).await;
    let router = Router::new(Arc::new(HttpTransport::new().unwrap()));
    router.register(ProviderConfig::new("local", server.base_url.clone(), "m"));

    let text: String = router
        .call_streaming(&RouteRequest::new("Quel temps ?"))
        .await
        .unwrap()
        .map(|chunk| chunk.unwrap())
        .collect::<Vec<_>>()
        .await
        .concat();

    assert_eq!(text, "Il fera beau");
    assert_eq!(router.health("local").unwrap().samples, 1);
}
