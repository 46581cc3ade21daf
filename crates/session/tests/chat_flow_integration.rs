use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use inference::{InferenceBackend, InferencePayload, InferenceRequest};
use parking_lot::Mutex;
use proto::{InferenceError, MessageContent, ModelCategory, Role};
use serde_json::{Value, json};
use session::{
    ApiKeyStore, ChatSettings, DashboardController, DemoController, FileStorage, MemoryStorage,
    SERVER_BUSY_MESSAGE, SendBlocked, SendSettled,
};

/// Backend returning queued responses and recording every request.
#[derive(Default)]
struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<Value, InferenceError>>>,
    requests: Mutex<Vec<InferenceRequest>>,
}

impl ScriptedBackend {
    fn with(responses: Vec<Result<Value, InferenceError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl InferenceBackend for ScriptedBackend {
    async fn infer(&self, request: InferenceRequest) -> Result<Value, InferenceError> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"response": "default"})))
    }
}

fn settings() -> ChatSettings {
    ChatSettings {
        generation_delay: Duration::ZERO,
        ..ChatSettings::default()
    }
}

fn demo() -> DemoController {
    DemoController::new(ApiKeyStore::new(Arc::new(MemoryStorage::new())), settings())
}

#[tokio::test]
async fn demo_sentiment_scenario_end_to_end() {
    let backend = ScriptedBackend::with(vec![Ok(json!({
        "result": [[
            {"label": "POSITIVE", "score": 0.9991},
            {"label": "NEGATIVE", "score": 0.0009}
        ]]
    }))]);
    let mut demo = demo();

    assert!(demo.validate_api_key(Some("hf_1234567890abcdef")));
    assert!(demo.is_demo());

    demo.set_model_category(ModelCategory::Sentiment);
    let models = demo.filtered_models();
    assert!(!models.is_empty());
    assert!(models.iter().all(|m| m.category == ModelCategory::Sentiment));

    demo.set_model(models[0].id).expect("select sentiment model");
    assert!(demo.messages()[0].text().contains("sentiment analysis"));

    let settled = demo
        .send_message(&backend, "I love this")
        .await
        .expect("send accepted");
    assert_eq!(settled, SendSettled::Resolved);

    let messages = demo.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].role, Role::User);
    assert_eq!(messages[1].text(), "I love this");
    let Some(MessageContent::Sentiment(summary)) = messages[2].content() else {
        panic!("structured sentiment expected, got {:?}", messages[2].state);
    };
    assert_eq!(summary.primary_sentiment.label, "POSITIVE");
    assert_eq!(summary.primary_sentiment.confidence, "99.91%");
    assert!(!demo.is_loading());

    let requests = backend.requests.lock();
    assert_eq!(requests[0].category, ModelCategory::Sentiment);
    assert_eq!(requests[0].api_key, "hf_1234567890abcdef");
}

#[tokio::test]
async fn network_failure_leaves_busy_message_and_clears_flags() {
    let backend = ScriptedBackend::with(vec![Err(InferenceError::Network(
        "connection refused".to_string(),
    ))]);
    let mut demo = demo();
    demo.validate_api_key(Some("hf_1234567890abcdef"));
    demo.set_model("Qwen/Qwen1.5-0.5B-Chat").expect("select");

    let settled = demo.send_message(&backend, "hello").await.expect("accepted");
    assert_eq!(settled, SendSettled::Failed);

    let last = demo.messages().last().expect("reply");
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(last.text(), SERVER_BUSY_MESSAGE);
    assert!(!demo.is_loading());
    assert!(!demo.is_generating());
    assert_eq!(backend.requests.lock().len(), 1, "failures are not retried");
}

#[tokio::test]
async fn conversation_history_counts_match_prior_turns() {
    let backend = ScriptedBackend::default();
    let mut demo = demo();
    demo.set_model("HuggingFaceH4/zephyr-7b-beta").expect("select");
    demo.set_authenticated(true);
    demo.validate_api_key(Some("hf_1234567890abcdef"));

    for text in ["one", "two", "three", "four"] {
        demo.send_message(&backend, text).await.expect("accepted");
    }

    let requests = backend.requests.lock();
    for (i, request) in requests.iter().enumerate() {
        let InferencePayload::Conversation {
            past_user_inputs,
            generated_responses,
            ..
        } = &request.payload
        else {
            panic!("conversation payload expected");
        };
        assert_eq!(past_user_inputs.len(), i);
        // welcome message plus one reply per earlier turn
        assert_eq!(generated_responses.len(), i + 1);
    }
}

#[tokio::test]
async fn demo_gate_blocks_fourth_send_without_calling_backend() {
    let backend = ScriptedBackend::default();
    let mut demo = demo();
    demo.validate_api_key(Some("hf_1234567890abcdef"));
    demo.set_model("Qwen/Qwen1.5-0.5B-Chat").expect("select");

    for _ in 0..3 {
        demo.send_message(&backend, "hi").await.expect("free send");
    }
    let err = demo
        .send_message(&backend, "hi")
        .await
        .expect_err("gate must engage");
    assert_eq!(err, SendBlocked::LoginRequired);
    assert_eq!(backend.requests.lock().len(), 3);
    assert!(demo.take_login_request());
}

#[tokio::test]
async fn dashboard_key_persists_across_restarts() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let storage = Arc::new(FileStorage::in_dir(tmp.path()));

    let mut first = DashboardController::new(ApiKeyStore::new(storage.clone()), settings());
    assert!(!first.is_key_valid());
    assert!(first.validate_api_key(Some("hf_persist_me_12345")));

    let second = DashboardController::new(ApiKeyStore::new(storage), settings());
    assert!(second.is_key_valid());
    assert!(second.has_existing_key());
    assert_eq!(second.api_key(), "hf_persist_me_12345");
}

#[tokio::test]
async fn dashboard_send_runs_against_backend_and_titles_chat() {
    let backend = ScriptedBackend::with(vec![Ok(json!([{"generated_text": "A short poem"}]))]);
    let mut dashboard = DashboardController::new(
        ApiKeyStore::new(Arc::new(MemoryStorage::new())),
        settings(),
    );
    dashboard.validate_api_key(Some("hf_1234567890abcdef"));
    let id = dashboard.create_new_chat();
    dashboard
        .set_model(&id, "microsoft/Phi-3-mini-4k-instruct")
        .expect("select");

    let settled = dashboard
        .send_message(&backend, &id, "Write a poem")
        .await
        .expect("accepted");
    assert_eq!(settled, SendSettled::Resolved);

    let chat = dashboard.chat(&id).expect("chat");
    assert_eq!(chat.title(), "Write a poem");
    assert_eq!(chat.messages().len(), 2);
    assert_eq!(chat.messages()[1].text(), "A short poem");
    assert!(dashboard.is_model_selection_locked(&id));
}
