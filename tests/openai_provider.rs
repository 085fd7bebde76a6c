//! OpenAI-compatible provider against a mock chat-completions endpoint.

use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use signal_relay::llm::ProviderError;
use signal_relay::llm::providers::openai_compatible::OpenAiCompatibleProvider;

fn provider(server: &MockServer, model: &str, api_key: Option<&str>) -> OpenAiCompatibleProvider {
    OpenAiCompatibleProvider::new(
        format!("{}/v1/chat/completions", server.uri()),
        model.to_string(),
        0.0,
        5,
        api_key.map(str::to_string),
    )
    .unwrap()
}

fn reply_with(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [ { "message": { "role": "assistant", "content": content } } ]
    }))
}

#[tokio::test]
async fn completes_and_trims_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(reply_with("  WAIT | reason: ranging\n"))
        .expect(1)
        .mount(&server)
        .await;

    let text = provider(&server, "gpt-4o-mini", Some("sk-test"))
        .complete("prompt", Some("system"))
        .await
        .unwrap();
    assert_eq!(text, "WAIT | reason: ranging");
}

#[tokio::test]
async fn sends_system_and_user_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply_with("WAIT | reason: test"))
        .mount(&server)
        .await;

    provider(&server, "gpt-4o-mini", None)
        .complete("the rules", Some("no extra words"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], "no extra words");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "the rules");
    assert_eq!(body["temperature"], 0.0);
}

#[tokio::test]
async fn gpt5_family_omits_temperature() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply_with("WAIT | reason: test"))
        .mount(&server)
        .await;

    provider(&server, "gpt-5-reasoning", None)
        .complete("prompt", None)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["model"], "gpt-5-reasoning");
    assert!(body.get("temperature").is_none());
}

#[tokio::test]
async fn error_envelope_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided", "code": "invalid_api_key" }
        })))
        .mount(&server)
        .await;

    let err = provider(&server, "gpt-4o-mini", Some("sk-bad"))
        .complete("prompt", None)
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("401"));
    assert!(msg.contains("invalid_api_key"));
    assert!(msg.contains("Incorrect API key"));
}

#[tokio::test]
async fn non_envelope_error_body_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = provider(&server, "gpt-4o-mini", None).complete("prompt", None).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("502"));
    assert!(msg.contains("bad gateway"));
}

#[tokio::test]
async fn missing_content_is_empty_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [ { "message": { "role": "assistant" } } ]
        })))
        .mount(&server)
        .await;

    let err = provider(&server, "gpt-4o-mini", None).complete("prompt", None).await.unwrap_err();
    assert!(matches!(err, ProviderError::EmptyReply));
}

#[tokio::test]
async fn no_choices_is_empty_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = provider(&server, "gpt-4o-mini", None).complete("prompt", None).await.unwrap_err();
    assert!(matches!(err, ProviderError::EmptyReply));
}
