//! Integration tests for the completion client and the submit transaction
//!
//! The completion service is a local wiremock server, so no API key is needed

use helpdesk_chat::core::llm::{CompletionService, LLMClient};
use helpdesk_chat::core::prompt::PromptTemplate;
use helpdesk_chat::{ResolutionError, Role, Settings, SubmitOutcome, System, Turn};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.llm.base_url = server.uri();
    settings.llm.timeout_secs = 5;
    settings
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_client_sends_bound_prompt_at_zero_temperature() {
    let server = MockServer::start().await;
    let prompt = PromptTemplate::helpdesk().format("How do I reset my password?");

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "llama-3.1-70b-versatile",
            "temperature": 0.0,
            "messages": [{"role": "user", "content": prompt}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "This is a User Account Management issue. Open the self-service portal.",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = LLMClient::new("test-key".to_string(), &settings_for(&server)).unwrap();
    let reply = client.complete(&prompt).await.unwrap();

    assert_eq!(
        reply,
        "This is a User Account Management issue. Open the self-service portal."
    );
}

#[tokio::test]
async fn test_rejection_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string(r#"{"error":{"message":"model not found"}}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = LLMClient::new("test-key".to_string(), &settings_for(&server)).unwrap();
    let err = client.complete("hello").await.unwrap_err();

    match err {
        ResolutionError::Rejected { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("model not found"));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_and_empty_payloads() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = LLMClient::new("test-key".to_string(), &settings_for(&server)).unwrap();

    assert!(matches!(
        client.complete("first").await,
        Err(ResolutionError::Malformed(_))
    ));
    assert!(matches!(
        client.complete("second").await,
        Err(ResolutionError::EmptyReply)
    ));
}

#[tokio::test]
async fn test_unreachable_service() {
    let mut settings = Settings::default();
    settings.llm.base_url = "http://127.0.0.1:1".to_string();
    settings.llm.timeout_secs = 2;

    let client = LLMClient::new("test-key".to_string(), &settings).unwrap();
    assert!(matches!(
        client.complete("hello").await,
        Err(ResolutionError::Unreachable(_))
    ));
}

#[tokio::test]
async fn test_password_reset_scenario() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("Step 1: open the portal.")),
        )
        .mount(&server)
        .await;

    let system = System::from_parts(settings_for(&server), "test-key".to_string()).unwrap();
    let mut session = system.session("scenario");

    let outcome = session.submit("How do I reset my password?").await;

    assert!(matches!(outcome, SubmitOutcome::Answered(_)));
    let turns: Vec<&Turn> = session.conversation().snapshot().collect();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0], &Turn::user("How do I reset my password?"));
    assert_eq!(turns[1].role, Role::Assistant);
    assert!(!turns[1].content.is_empty());
}

#[tokio::test]
async fn test_two_queries_keep_submission_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [{"role": "user", "content": PromptTemplate::helpdesk().format("My laptop will not boot")}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hardware answer")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [{"role": "user", "content": PromptTemplate::helpdesk().format("I clicked a phishing link")}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Security answer")))
        .mount(&server)
        .await;

    let system = System::from_parts(settings_for(&server), "test-key".to_string()).unwrap();
    let mut session = system.session("ordering");

    session.submit("My laptop will not boot").await;
    session.submit("I clicked a phishing link").await;

    let turns: Vec<Turn> = session.conversation().snapshot().cloned().collect();
    assert_eq!(
        turns,
        vec![
            Turn::user("My laptop will not boot"),
            Turn::assistant("Hardware answer"),
            Turn::user("I clicked a phishing link"),
            Turn::assistant("Security answer"),
        ]
    );
}

#[tokio::test]
async fn test_service_failure_leaves_only_user_turn() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let system = System::from_parts(settings_for(&server), "bad-key".to_string()).unwrap();
    let mut session = system.session("failure");

    let outcome = session.submit("Why is my VPN slow?").await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Failed(ResolutionError::Rejected { status: 401, .. })
    ));
    assert_eq!(session.conversation().len(), 1);
    assert!(session.notice().is_some());
}
