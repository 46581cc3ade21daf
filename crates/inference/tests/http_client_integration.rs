use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};
use inference::{
    GenerationParams, HttpInferenceClient, InferenceBackend, InferenceRequest, format_response,
};
use parking_lot::Mutex;
use proto::{ChatMessage, InferenceError, MessageContent, ModelCategory};
use serde_json::{Value, json};

#[derive(Default)]
struct Captured {
    calls: Mutex<Vec<(String, Value)>>,
}

async fn huggingface(
    State(captured): State<Arc<Captured>>,
    Path(category): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    captured.calls.lock().push((category.clone(), body.clone()));
    match category.as_str() {
        "sentiment" => (
            StatusCode::OK,
            Json(json!({"result": [[
                {"label": "NEGATIVE", "score": 0.0002},
                {"label": "POSITIVE", "score": 0.9998}
            ]]})),
        ),
        "creative" => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "Model is currently loading"})),
        ),
        _ => (
            StatusCode::OK,
            Json(json!({"response": format!("echo: {}", body["message"].as_str().unwrap_or(""))})),
        ),
    }
}

async fn spawn_proxy() -> (String, Arc<Captured>) {
    let captured = Arc::new(Captured::default());
    let app = Router::new()
        .route("/api/huggingface/{category}", post(huggingface))
        .with_state(captured.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock proxy serve");
    });
    (format!("http://{addr}/api"), captured)
}

#[tokio::test]
async fn sentiment_request_round_trips_through_formatter() {
    let (base, captured) = spawn_proxy().await;
    let client = HttpInferenceClient::with_base_url(base);
    let request = InferenceRequest::build(
        ModelCategory::Sentiment,
        "distilbert-base-uncased-finetuned-sst-2-english",
        "I love this",
        &[],
        "hf_1234567890abcdef",
        GenerationParams::default(),
    );

    let raw = client.infer(request).await.expect("sentiment call succeeds");
    let content = format_response(&raw, ModelCategory::Sentiment, "I love this");
    let MessageContent::Sentiment(summary) = content else {
        panic!("structured sentiment expected");
    };
    assert_eq!(summary.primary_sentiment.label, "POSITIVE");
    assert_eq!(summary.primary_sentiment.confidence, "99.98%");

    let calls = captured.calls.lock();
    assert_eq!(calls.len(), 1);
    let (category, body) = &calls[0];
    assert_eq!(category, "sentiment");
    assert_eq!(body["prompt"], "I love this");
    assert_eq!(body["apiKey"], "hf_1234567890abcdef");
    assert_eq!(body["model"], "distilbert-base-uncased-finetuned-sst-2-english");
}

#[tokio::test]
async fn conversation_request_sends_history_arrays() {
    let (base, captured) = spawn_proxy().await;
    let client = HttpInferenceClient::with_base_url(base);
    let history = vec![
        ChatMessage::user("hi"),
        ChatMessage::assistant(MessageContent::Markdown("hello there".to_string())),
    ];
    let request = InferenceRequest::build(
        ModelCategory::Conversation,
        "Qwen/Qwen1.5-0.5B-Chat",
        "how are you?",
        &history,
        "hf_1234567890abcdef",
        GenerationParams::default(),
    );

    let raw = client.infer(request).await.expect("conversation call succeeds");
    assert_eq!(raw["response"], "echo: how are you?");

    let calls = captured.calls.lock();
    let (_, body) = &calls[0];
    assert_eq!(body["past_user_inputs"], json!(["hi"]));
    assert_eq!(body["generated_responses"], json!(["hello there"]));
}

#[tokio::test]
async fn non_success_status_maps_to_status_error() {
    let (base, _captured) = spawn_proxy().await;
    let client = HttpInferenceClient::with_base_url(base);
    let request = InferenceRequest::build(
        ModelCategory::Creative,
        "facebook/opt-1.3b",
        "a haiku",
        &[],
        "hf_1234567890abcdef",
        GenerationParams::default(),
    );

    let err = client
        .infer(request)
        .await
        .expect_err("503 must surface as an error");
    match err {
        InferenceError::Status { status, body } => {
            assert_eq!(status, 503);
            assert!(body.contains("loading"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_proxy_maps_to_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let client = HttpInferenceClient::with_base_url(format!("http://127.0.0.1:{port}/api"));
    let request = InferenceRequest::build(
        ModelCategory::Creative,
        "facebook/opt-1.3b",
        "a haiku",
        &[],
        "hf_1234567890abcdef",
        GenerationParams::default(),
    );
    let err = client.infer(request).await.expect_err("connection refused");
    assert!(matches!(err, InferenceError::Network(_)));
}
