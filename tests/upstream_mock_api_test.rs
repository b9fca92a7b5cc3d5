//! Mock API tests for the upstream caller and the fallback dispatcher.
//!
//! These tests use wiremock to simulate an OpenAI-compatible upstream.
//! Response fixtures follow the chat-completions format:
//! https://platform.openai.com/docs/api-reference/chat/object

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use yumcha_relay::{
    ChatRequest, Dispatcher, FallbackOrder, HttpUpstream, ModelRegistry, RelayConfig, RelayError,
};

fn completion_response(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1677652288,
        "model": "a-id",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": content
            },
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": 9,
            "completion_tokens": 12,
            "total_tokens": 21
        }
    })
}

fn error_response(message: &str, error_type: &str) -> serde_json::Value {
    json!({
        "error": {
            "message": message,
            "type": error_type,
            "param": null,
            "code": null
        }
    })
}

/// Dispatcher over the real HTTP caller, pointed at the mock server.
/// Registry: A/B/C, fallback order [A, B, C].
fn relay(upstream_uri: &str, timeout: Duration) -> Dispatcher {
    let config = RelayConfig::new("test-api-key", upstream_uri, timeout);
    let mut registry = ModelRegistry::new();
    registry.register("A", "a-id");
    registry.register("B", "b-id");
    registry.register("C", "c-id");
    let fallback =
        FallbackOrder::new(vec!["A".into(), "B".into(), "C".into()], &registry).unwrap();
    let upstream = Arc::new(HttpUpstream::new(&config).unwrap());
    Dispatcher::new(registry, fallback, upstream)
}

fn request(model_key: &str) -> ChatRequest {
    ChatRequest {
        message: "Hello".to_string(),
        model_key: model_key.to_string(),
    }
}

#[tokio::test]
async fn requested_model_success_makes_exactly_one_attempt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-api-key"))
        .and(body_partial_json(json!({
            "model": "b-id",
            "messages": [{"role": "user", "content": "Hello"}]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_response("Hello! How can I help you today?")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let reply = relay(&mock_server.uri(), Duration::from_secs(5))
        .dispatch(&request("B"))
        .await
        .unwrap();

    assert_eq!(reply.reply, "Hello! How can I help you today?");
    assert_eq!(reply.served_by, "B");
}

#[tokio::test]
async fn falls_back_in_order_when_requested_model_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "b-id"})))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(error_response("b is down", "server_error")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    // B requested and failed; fallback order [A, B, C] skips B, so A serves.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "a-id"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response("from A")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let reply = relay(&mock_server.uri(), Duration::from_secs(5))
        .dispatch(&request("B"))
        .await
        .unwrap();

    assert_eq!(reply.reply, "from A");
    assert_eq!(reply.served_by, "A");
}

#[tokio::test]
async fn exhaustion_carries_the_last_envelope_message() {
    let mock_server = MockServer::start().await;

    for (model, message) in [
        ("a-id", "a overloaded"),
        ("b-id", "b overloaded"),
        ("c-id", "c overloaded"),
    ] {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({"model": model})))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(error_response(message, "server_error")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let err = relay(&mock_server.uri(), Duration::from_secs(5))
        .dispatch(&request("A"))
        .await
        .unwrap_err();

    match err {
        RelayError::Exhausted { attempts, last } => {
            assert_eq!(attempts, 3);
            assert_eq!(last.status, Some(503));
            assert_eq!(last.detail, "c overloaded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn missing_content_is_an_empty_string_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-456",
            "object": "chat.completion",
            "choices": [{"index": 0, "message": {"role": "assistant"}}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let reply = relay(&mock_server.uri(), Duration::from_secs(5))
        .dispatch(&request("A"))
        .await
        .unwrap();

    // Reachable-but-contentless responses succeed with an empty reply; no
    // fallback is attempted.
    assert_eq!(reply.reply, "");
    assert_eq!(reply.served_by, "A");
}

#[tokio::test]
async fn non_json_success_body_triggers_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "a-id"})))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy garbage</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "b-id"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response("from B")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let reply = relay(&mock_server.uri(), Duration::from_secs(5))
        .dispatch(&request("A"))
        .await
        .unwrap();

    assert_eq!(reply.served_by, "B");
}

#[tokio::test]
async fn hanging_upstream_times_out_and_falls_back_like_any_failure() {
    let mock_server = MockServer::start().await;

    // A hangs past the configured timeout; the dispatcher must move on to B
    // exactly as it would for an error status.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "a-id"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_response("too late"))
                .set_delay(Duration::from_secs(10)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "b-id"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response("from B")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let reply = relay(&mock_server.uri(), Duration::from_millis(250))
        .dispatch(&request("A"))
        .await
        .unwrap();

    assert_eq!(reply.reply, "from B");
    assert_eq!(reply.served_by, "B");
}

#[tokio::test]
async fn transport_failure_has_no_status() {
    // Nothing is listening on this port.
    let relay = relay("http://127.0.0.1:9", Duration::from_secs(1));
    let err = relay.dispatch(&request("A")).await.unwrap_err();

    match err {
        RelayError::Exhausted { attempts, last } => {
            assert_eq!(attempts, 3);
            assert_eq!(last.status, None);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
