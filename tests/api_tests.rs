use ask_relay::cli::Args;
use ask_relay::llm::{ GenerativeClient, LlmError };
use ask_relay::models::chat::Turn;
use ask_relay::relay::Relay;
use ask_relay::server::{ api::start_http_server, build_router, AppState };
use axum::body::{ to_bytes, Body };
use axum::http::{ header, Method, Request, StatusCode };
use clap::Parser;
use serde_json::{ json, Value };
use std::sync::{ Arc, Mutex };
use tower::ServiceExt;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Generate(String),
    Chat(Vec<Turn>, String),
}

/// Records every call and answers with a canned result.
struct MockClient {
    calls: Mutex<Vec<Call>>,
    reply: Box<dyn Fn() -> Result<String, LlmError> + Send + Sync>,
}

impl MockClient {
    fn answering(answer: &'static str) -> Arc<Self> {
        Arc::new(Self { calls: Mutex::new(Vec::new()), reply: Box::new(move || Ok(answer.to_string())) })
    }

    fn failing(make: fn() -> LlmError) -> Arc<Self> {
        Arc::new(Self { calls: Mutex::new(Vec::new()), reply: Box::new(move || Err(make())) })
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl GenerativeClient for MockClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(Call::Generate(prompt.to_string()));
        (self.reply)()
    }

    async fn chat(&self, history: &[Turn], message: &str) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(Call::Chat(history.to_vec(), message.to_string()));
        (self.reply)()
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}

fn app(client: Arc<MockClient>) -> axum::Router {
    build_router(AppState::new(Relay::new(client)))
}

async fn post_ask(router: axum::Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/ask")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn standalone_question_uses_generate() {
    let client = MockClient::answering("Compound interest is interest on interest!");
    let (status, body) = post_ask(app(client.clone()), r#"{"question":"Q"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"answer": "Compound interest is interest on interest!"}));
    assert_eq!(client.calls(), vec![Call::Generate("Q".into())]);
}

#[tokio::test]
async fn history_seeds_a_chat_call() {
    let client = MockClient::answering("ok");
    let body = json!({
        "question": "And bonds?",
        "history": [
            {"role": "user", "content": "What are stocks?"},
            {"role": "model", "parts": [{"text": "Little pieces of a company."}]}
        ]
    });
    let (status, _) = post_ask(app(client.clone()), &body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        client.calls(),
        vec![
            Call::Chat(
                vec![Turn::user("What are stocks?"), Turn::model("Little pieces of a company.")],
                "And bonds?".into()
            )
        ]
    );
}

#[tokio::test]
async fn empty_history_array_still_uses_chat() {
    let client = MockClient::answering("ok");
    post_ask(app(client.clone()), r#"{"question":"Q","history":[]}"#).await;
    assert_eq!(client.calls(), vec![Call::Chat(vec![], "Q".into())]);
}

#[tokio::test]
async fn invalid_history_falls_back_to_standalone() {
    let client = MockClient::answering("ok");
    let (status, _) = post_ask(app(client.clone()), r#"{"question":"Q","history":"not a list"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(client.calls(), vec![Call::Generate("Q".into())]);
}

#[tokio::test]
async fn missing_or_empty_question_is_rejected_without_calling_out() {
    for body in [r#"{}"#, r#"{"question":""}"#, r#"{"history":[]}"#, r#"{"question":null}"#] {
        let client = MockClient::answering("never");
        let (status, json_body) = post_ask(app(client.clone()), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(json_body, json!({"error": "question is required"}));
        assert!(client.calls().is_empty());
    }
}

#[tokio::test]
async fn non_object_bodies_have_no_question() {
    for body in [r#"["Q"]"#, r#"[]"#, r#""Q""#, r#"null"#] {
        let client = MockClient::answering("never");
        let (status, json_body) = post_ask(app(client.clone()), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(json_body, json!({"error": "question is required"}));
        assert!(client.calls().is_empty(), "body {}", body);
    }
}

#[tokio::test]
async fn body_without_json_content_type_has_no_question() {
    let client = MockClient::answering("never");
    let request = Request::builder()
        .method("POST")
        .uri("/api/ask")
        .body(Body::from("question=Q"))
        .unwrap();
    let response = app(client.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let client = MockClient::answering("never");
    let (status, body) = post_ask(app(client.clone()), r#"{"question": "#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid request body");
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn safety_failure_is_classified() {
    let client = MockClient::failing(|| LlmError::Other("[400] Response was blocked due to SAFETY".into()));
    let (status, body) = post_ask(app(client), r#"{"question":"Q"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "The question was blocked by the safety filters");
    assert_eq!(body["details"], "[400] Response was blocked due to SAFETY");
}

#[tokio::test]
async fn credential_failure_is_classified() {
    let client = MockClient::failing(|| LlmError::Other("API_KEY_INVALID".into()));
    let (status, body) = post_ask(app(client), r#"{"question":"Q"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "There is a problem with the API key");
    assert_eq!(body["details"], "API_KEY_INVALID");
}

#[tokio::test]
async fn other_failures_are_generic() {
    let client = MockClient::failing(|| LlmError::Other("model overloaded".into()));
    let (status, body) = post_ask(app(client), r#"{"question":"Q"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to generate a response", "details": "model overloaded"}));
}

#[tokio::test]
async fn rate_limit_rejects_excess_requests() {
    let client = MockClient::answering("ok");
    let router = build_router(AppState::new(Relay::new(client.clone())).with_rate_limit(1));

    let (first, _) = post_ask(router.clone(), r#"{"question":"Q"}"#).await;
    let (second, body) = post_ask(router, r#"{"question":"Q"}"#).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, json!({"error": "too many requests"}));
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn health_reports_model() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app(MockClient::answering("ok")).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"status": "ok", "model": "mock-model"}));
}

#[tokio::test]
async fn cors_preflight_allows_any_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/ask")
        .header(header::ORIGIN, "http://localhost:8080")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let client = MockClient::answering("never");
    let response = app(client.clone()).oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn cross_origin_answers_carry_the_allow_origin_header() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/ask")
        .header(header::ORIGIN, "http://localhost:8080")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"question":"Q"}"#))
        .unwrap();
    let response = app(MockClient::answering("ok")).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn tls_without_a_key_refuses_to_start() {
    let args = Args::parse_from([
        "ask-relay",
        "--host",
        "127.0.0.1",
        "--port",
        "0",
        "--enable-tls",
        "--tls-cert-path",
        "cert.pem",
    ]);
    let err = start_http_server(&args, Relay::new(MockClient::answering("never"))).await.unwrap_err();
    assert_eq!(err.to_string(), "Missing TLS certificate or key path");
}

#[tokio::test]
async fn tls_without_cert_or_key_refuses_to_start() {
    let args = Args::parse_from(["ask-relay", "--host", "127.0.0.1", "--port", "0", "--enable-tls"]);
    let err = start_http_server(&args, Relay::new(MockClient::answering("never"))).await.unwrap_err();
    assert_eq!(err.to_string(), "TLS enabled without cert/key");
}
