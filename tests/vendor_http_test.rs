//! Integration tests for the vendor adapters against a mocked HTTP server.

mod common;

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aicommits::VendorError;
use aicommits::commit::Turn;
use aicommits::llm::{Vendor, VendorKind, VendorSettings, connect};

use common::sample_request;

const CONTINUATION: &str = r#""commits": [{"message": "feat(app): add retry loop", "score": 90}, {"message": "fix(app): retry requests", "score": 95}]}"#;

fn settings(kind: VendorKind, base_url: String) -> VendorSettings {
    VendorSettings {
        kind,
        model: "test-model".to_string(),
        api_key: Some("sk-test".to_string()),
        base_url,
        timeout: Duration::from_secs(5),
    }
}

fn vendor_for(kind: VendorKind, server: &MockServer) -> Box<dyn Vendor> {
    connect(settings(kind, server.uri()), reqwest::Client::new())
}

fn chat_completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]
    })
}

/// The JSON body of the single request the server received.
async fn received_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.expect("request recording enabled");
    assert_eq!(requests.len(), 1, "expected exactly one request");
    requests[0].body_json().expect("request body is JSON")
}

fn roles(messages: &Value) -> Vec<String> {
    messages
        .as_array()
        .expect("messages array")
        .iter()
        .map(|m| m["role"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_openai_sends_primed_transcript_and_restores_primer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "temperature": 0.0,
            "max_tokens": 1000,
            "response_format": {"type": "json_object"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body(CONTINUATION)))
        .mount(&server)
        .await;

    let vendor = vendor_for(VendorKind::OpenAi, &server);
    let result = vendor.generate(&sample_request(vec![])).await.unwrap();

    assert_eq!(result.raw_text, format!("{{{CONTINUATION}"));
    let messages: Vec<&str> = result.candidates.iter().map(|c| c.message.as_str()).collect();
    assert_eq!(messages, vec!["fix(app): retry requests", "feat(app): add retry loop"]);

    let body = received_body(&server).await;
    assert_eq!(roles(&body["messages"]), vec!["system", "user", "assistant"]);
    assert_eq!(body["messages"][2]["content"], "{");
    assert!(body["messages"][1]["content"].as_str().unwrap().contains("src/app.ts"));
}

#[tokio::test]
async fn test_history_is_replayed_before_primer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body(CONTINUATION)))
        .mount(&server)
        .await;

    let history = vec![Turn::new(
        r#"{"commits": [{"message": "feat(app): add retry", "score": 80}]}"#,
        "Remove the scope.\n\nAdd extra context: mention performance",
    )];
    let vendor = vendor_for(VendorKind::Gemini, &server);
    vendor.generate(&sample_request(history)).await.unwrap();

    let body = received_body(&server).await;
    assert_eq!(
        roles(&body["messages"]),
        vec!["system", "user", "assistant", "user", "assistant"]
    );
    assert_eq!(
        body["messages"][3]["content"],
        "Remove the scope.\n\nAdd extra context: mention performance"
    );
    assert_eq!(body["temperature"], json!(0.8));
    assert!(body.get("max_tokens").is_none());
}

#[tokio::test]
async fn test_anthropic_sends_system_separately() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "sk-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": CONTINUATION}],
            "stop_reason": "end_turn"
        })))
        .mount(&server)
        .await;

    let vendor = vendor_for(VendorKind::Anthropic, &server);
    let result = vendor.generate(&sample_request(vec![])).await.unwrap();
    assert_eq!(result.candidates[0].score, 95);

    let body = received_body(&server).await;
    assert!(body["system"].as_str().unwrap().contains("Conventional Commits"));
    assert_eq!(roles(&body["messages"]), vec!["user", "assistant"]);
    assert_eq!(body["max_tokens"], 1000);
    assert_eq!(body["temperature"], json!(0.0));
}

#[tokio::test]
async fn test_ollama_reads_message_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"stream": false, "options": {"temperature": 0}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3",
            "message": {"role": "assistant", "content": CONTINUATION},
            "done": true
        })))
        .mount(&server)
        .await;

    let vendor = vendor_for(VendorKind::Ollama, &server);
    let result = vendor.generate(&sample_request(vec![])).await.unwrap();
    assert_eq!(result.candidates.len(), 2);
    assert_eq!(result.advisory, None);
}

#[tokio::test]
async fn test_full_object_reply_is_not_double_primed() {
    let server = MockServer::start().await;
    let full = r#"{"commits": [{"message": "docs: fix typo", "score": 40}], "advisory": "Small change"}"#;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": full}
        })))
        .mount(&server)
        .await;

    let vendor = vendor_for(VendorKind::Ollama, &server);
    let result = vendor.generate(&sample_request(vec![])).await.unwrap();
    assert_eq!(result.raw_text, full);
    assert_eq!(result.advisory.as_deref(), Some("Small change"));
}

#[tokio::test]
async fn test_http_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let vendor = vendor_for(VendorKind::OpenAi, &server);
    let err = vendor.generate(&sample_request(vec![])).await.unwrap_err();
    match err {
        VendorError::Http { vendor, status, body } => {
            assert_eq!(vendor, "OpenAI");
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("Expected Http error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"content": [{"type": "text", "text": CONTINUATION}]}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut slow = settings(VendorKind::Anthropic, server.uri());
    slow.timeout = Duration::from_millis(200);
    let vendor = connect(slow, reqwest::Client::new());

    let err = vendor.generate(&sample_request(vec![])).await.unwrap_err();
    assert!(
        matches!(err, VendorError::Timeout { vendor: "Anthropic", .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_unexpected_envelope_is_decode_error_with_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy login</html>"))
        .mount(&server)
        .await;

    let vendor = vendor_for(VendorKind::OpenAi, &server);
    let err = vendor.generate(&sample_request(vec![])).await.unwrap_err();
    match err {
        VendorError::Decode(decode) => assert_eq!(decode.raw(), "<html>proxy login</html>"),
        other => panic!("Expected Decode error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_candidates_are_decode_error_not_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body(r#""commits": []}"#)))
        .mount(&server)
        .await;

    let vendor = vendor_for(VendorKind::OpenAi, &server);
    let err = vendor.generate(&sample_request(vec![])).await.unwrap_err();
    match err {
        VendorError::Decode(decode) => {
            assert_eq!(decode.raw(), r#"{"commits": []}"#);
            assert!(decode.reason().contains("no candidates"));
        }
        other => panic!("Expected Decode error, got: {:?}", other),
    }
}
