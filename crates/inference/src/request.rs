//! Request payloads for the inference proxy.

use proto::{ChatMessage, ModelCategory, Role};
use serde::Serialize;

/// Default `maxLength` sent with every request.
pub const DEFAULT_MAX_LENGTH: u32 = 500;
/// Default sampling temperature sent with every request.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Generation knobs forwarded verbatim to the proxy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_length: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Category-specific part of the request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InferencePayload {
    /// Conversation models receive the prior turns alongside the new message.
    Conversation {
        message: String,
        past_user_inputs: Vec<String>,
        generated_responses: Vec<String>,
    },
    /// Creative and sentiment models receive a single prompt.
    Prompt { prompt: String },
}

/// One call to `POST {base}/huggingface/{category}`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceRequest {
    #[serde(skip)]
    pub category: ModelCategory,
    pub model: String,
    #[serde(flatten)]
    pub payload: InferencePayload,
    pub max_length: u32,
    pub temperature: f32,
    pub api_key: String,
}

impl std::fmt::Debug for InferenceRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceRequest")
            .field("category", &self.category)
            .field("model", &self.model)
            .field("payload", &self.payload)
            .field("max_length", &self.max_length)
            .field("temperature", &self.temperature)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl InferenceRequest {
    /// Builds a request for `content`. `history` holds the turns that precede
    /// the new user message; pending placeholders in it are skipped.
    pub fn build(
        category: ModelCategory,
        model: impl Into<String>,
        content: impl Into<String>,
        history: &[ChatMessage],
        api_key: impl Into<String>,
        params: GenerationParams,
    ) -> Self {
        let content = content.into();
        let payload = match category {
            ModelCategory::Conversation => {
                let past_user_inputs = history
                    .iter()
                    .filter(|m| m.role == Role::User)
                    .map(ChatMessage::text)
                    .collect();
                let generated_responses = history
                    .iter()
                    .filter(|m| m.role == Role::Assistant && !m.is_pending())
                    .map(ChatMessage::text)
                    .collect();
                InferencePayload::Conversation {
                    message: content,
                    past_user_inputs,
                    generated_responses,
                }
            }
            ModelCategory::Creative | ModelCategory::Sentiment => {
                InferencePayload::Prompt { prompt: content }
            }
        };

        Self {
            category,
            model: model.into(),
            payload,
            max_length: params.max_length,
            temperature: params.temperature,
            api_key: api_key.into(),
        }
    }

    /// The user text this request carries.
    pub fn input(&self) -> &str {
        match &self.payload {
            InferencePayload::Conversation { message, .. } => message,
            InferencePayload::Prompt { prompt } => prompt,
        }
    }
}

#[cfg(test)]
mod tests {
    use proto::{MessageContent, ModelCategory};

    use super::*;

    fn history() -> Vec<ChatMessage> {
        vec![
            ChatMessage::assistant(MessageContent::Text("Hello! I'm Zephyr".to_string())),
            ChatMessage::user("first question"),
            ChatMessage::assistant(MessageContent::Markdown("first answer".to_string())),
        ]
    }

    #[test]
    fn conversation_request_splits_history_by_role() {
        let req = InferenceRequest::build(
            ModelCategory::Conversation,
            "HuggingFaceH4/zephyr-7b-beta",
            "second question",
            &history(),
            "hf_key_1234567",
            GenerationParams::default(),
        );

        let body = serde_json::to_value(&req).expect("serialize request");
        assert_eq!(body["model"], "HuggingFaceH4/zephyr-7b-beta");
        assert_eq!(body["message"], "second question");
        assert_eq!(body["past_user_inputs"], serde_json::json!(["first question"]));
        assert_eq!(
            body["generated_responses"],
            serde_json::json!(["Hello! I'm Zephyr", "first answer"])
        );
        assert_eq!(body["maxLength"], 500);
        assert_eq!(body["apiKey"], "hf_key_1234567");
        assert!(body.get("prompt").is_none());
        assert!(body.get("category").is_none());
    }

    #[test]
    fn prompt_request_omits_conversation_fields() {
        let req = InferenceRequest::build(
            ModelCategory::Sentiment,
            "distilbert-base-uncased-finetuned-sst-2-english",
            "I love this",
            &history(),
            "hf_key_1234567",
            GenerationParams {
                max_length: 64,
                temperature: 0.2,
            },
        );

        let body = serde_json::to_value(&req).expect("serialize request");
        assert_eq!(body["prompt"], "I love this");
        assert_eq!(body["maxLength"], 64);
        assert!(body.get("past_user_inputs").is_none());
        assert_eq!(req.input(), "I love this");
    }

    #[test]
    fn pending_placeholders_are_not_sent_as_generated_responses() {
        let mut turns = history();
        turns.push(ChatMessage::placeholder());
        let req = InferenceRequest::build(
            ModelCategory::Conversation,
            "Qwen/Qwen1.5-0.5B-Chat",
            "next",
            &turns,
            "hf_key_1234567",
            GenerationParams::default(),
        );
        let InferencePayload::Conversation {
            generated_responses,
            ..
        } = &req.payload
        else {
            panic!("conversation payload expected");
        };
        assert_eq!(generated_responses.len(), 2);
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let req = InferenceRequest::build(
            ModelCategory::Creative,
            "facebook/opt-1.3b",
            "a poem",
            &[],
            "hf_secret_value",
            GenerationParams::default(),
        );
        let rendered = format!("{req:?}");
        assert!(!rendered.contains("hf_secret_value"));
        assert!(rendered.contains("<redacted>"));
    }
}
