//! Message-list bookkeeping shared by the demo and dashboard controllers.

use std::time::{Duration, Instant};

use inference::{GenerationParams, InferenceRequest, format_response};
use proto::{
    ChatMessage, InferenceError, MessageId, MessageState, ModelCategory, ModelDescriptor, SessionId,
};
use serde_json::Value;
use tracing::{debug, warn};

/// Shown in place of a reply when the inference call fails.
pub const SERVER_BUSY_MESSAGE: &str =
    "The server is busy right now and could not generate a response. Please try again in a moment.";

/// Keys longer than this many characters are accepted.
pub const MIN_API_KEY_LEN: usize = 10;

const GENERIC_WELCOME: &str = "Hello! I'm your AI assistant. Choose a model and start chatting with me. What would you like to discuss today?";

/// Length check applied to candidate keys. Deliberately permissive: the proxy
/// is the real authority on whether a key works.
pub fn is_plausible_api_key(key: &str) -> bool {
    key.chars().count() > MIN_API_KEY_LEN
}

/// Greeting for the selected model, or a generic one when none is selected.
pub fn welcome_text(model: Option<&ModelDescriptor>) -> String {
    let Some(model) = model else {
        return GENERIC_WELCOME.to_string();
    };
    match model.category {
        ModelCategory::Conversation => format!(
            "Hello! I'm {}, a conversational AI assistant. How can I help you today?",
            model.name
        ),
        ModelCategory::Creative => format!(
            "Hello! I'm {}, a creative writing assistant. I can help with stories, poems, or other creative content. What would you like me to write about?",
            model.name
        ),
        ModelCategory::Sentiment => format!(
            "Hello! I'm {}, a sentiment analysis model. Share some text with me, and I'll analyze its emotional tone and sentiment.",
            model.name
        ),
    }
}

/// Where a controller (or one dashboard chat) sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    /// No key entered.
    Idle,
    /// A key is entered but not validated.
    KeyPending,
    /// Key accepted, no model chosen.
    KeyValidated,
    /// Ready to send.
    ModelSelected,
    /// User message and placeholder appended, request not yet dispatched.
    Sending,
    /// Request dispatched, waiting for the proxy.
    AwaitingResponse,
    /// Last reply resolved.
    Settled,
    /// Last reply failed.
    Failed,
}

/// Reason a send was not started. None of these touch the message list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendBlocked {
    EmptyMessage,
    KeyNotValidated,
    NoModelSelected,
    /// A reply for this conversation is still outstanding.
    RequestInFlight,
    /// Demo usage ceiling reached while signed out; the UI should offer login.
    LoginRequired,
    /// Dashboard chat id does not exist.
    UnknownChat,
}

/// How a placeholder was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendSettled {
    Resolved,
    Failed,
    /// The conversation was cleared or deleted while the request was out.
    Stale,
}

/// A started send: the placeholder to resolve and the request to dispatch.
#[derive(Debug, Clone)]
pub struct PendingSend {
    /// Dashboard chat the send belongs to; `None` for the demo.
    pub chat: Option<SessionId>,
    pub placeholder: MessageId,
    pub request: InferenceRequest,
}

#[derive(Debug, Clone)]
struct InFlight {
    placeholder: MessageId,
    category: ModelCategory,
    input: String,
    dispatched: bool,
}

/// Ordered message list plus the state of its at-most-one outstanding reply.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    in_flight: Option<InFlight>,
    generating_until: Option<Instant>,
    outcome: Option<SendSettled>,
}

impl Conversation {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of user-authored messages.
    pub fn user_turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == proto::Role::User)
            .count()
    }

    /// True while a request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// True while a request is outstanding and for the cosmetic delay after a
    /// successful reply.
    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
            || self
                .generating_until
                .is_some_and(|until| Instant::now() < until)
    }

    /// Phase contributed by the send lifecycle, if any.
    pub(crate) fn send_phase(&self) -> Option<ChatPhase> {
        match (&self.in_flight, self.outcome) {
            (Some(f), _) if f.dispatched => Some(ChatPhase::AwaitingResponse),
            (Some(_), _) => Some(ChatPhase::Sending),
            (None, Some(SendSettled::Resolved)) => Some(ChatPhase::Settled),
            (None, Some(SendSettled::Failed)) => Some(ChatPhase::Failed),
            _ => None,
        }
    }

    /// Drops every message and any outstanding reply, then appends `greeting`.
    pub(crate) fn reset(&mut self, greeting: Option<String>) {
        if let Some(f) = self.in_flight.take() {
            debug!(placeholder = %f.placeholder, "Discarding outstanding reply on reset");
        }
        self.messages.clear();
        self.generating_until = None;
        self.outcome = None;
        if let Some(text) = greeting {
            self.messages
                .push(ChatMessage::assistant(proto::MessageContent::Text(text)));
        }
    }

    pub(crate) fn greet_if_empty(&mut self, greeting: String) -> bool {
        if !self.messages.is_empty() {
            return false;
        }
        self.messages
            .push(ChatMessage::assistant(proto::MessageContent::Text(greeting)));
        true
    }

    /// Appends the user message and a pending placeholder and builds the
    /// request from the turns that preceded them.
    pub(crate) fn start(
        &mut self,
        chat: Option<SessionId>,
        model: &ModelDescriptor,
        content: &str,
        api_key: &str,
        params: GenerationParams,
    ) -> Result<PendingSend, SendBlocked> {
        if self.in_flight.is_some() {
            return Err(SendBlocked::RequestInFlight);
        }

        let request = InferenceRequest::build(
            model.category,
            model.id,
            content,
            &self.messages,
            api_key,
            params,
        );
        self.messages.push(ChatMessage::user(content));
        let placeholder = ChatMessage::placeholder();
        let placeholder_id = placeholder.id;
        self.messages.push(placeholder);

        self.in_flight = Some(InFlight {
            placeholder: placeholder_id,
            category: model.category,
            input: content.to_string(),
            dispatched: false,
        });
        self.generating_until = None;
        self.outcome = None;

        Ok(PendingSend {
            chat,
            placeholder: placeholder_id,
            request,
        })
    }

    pub(crate) fn mark_dispatched(&mut self, placeholder: MessageId) -> bool {
        match self.in_flight.as_mut() {
            Some(f) if f.placeholder == placeholder => {
                f.dispatched = true;
                true
            }
            _ => false,
        }
    }

    /// Resolves or fails the placeholder. Replies for a placeholder that is no
    /// longer outstanding are discarded.
    pub(crate) fn settle(
        &mut self,
        placeholder: MessageId,
        result: Result<Value, InferenceError>,
        generation_delay: Duration,
    ) -> SendSettled {
        let in_flight = match self.in_flight.take() {
            Some(f) if f.placeholder == placeholder => f,
            other => {
                self.in_flight = other;
                debug!(placeholder = %placeholder, "Discarding stale reply");
                return SendSettled::Stale;
            }
        };

        let (state, settled) = match result {
            Ok(raw) => {
                let content = format_response(&raw, in_flight.category, &in_flight.input);
                self.generating_until = Some(Instant::now() + generation_delay);
                (MessageState::Resolved(content), SendSettled::Resolved)
            }
            Err(e) => {
                warn!(error = %e, category = %in_flight.category, "Inference request failed");
                self.generating_until = None;
                (
                    MessageState::Failed(SERVER_BUSY_MESSAGE.to_string()),
                    SendSettled::Failed,
                )
            }
        };

        match self.messages.iter_mut().find(|m| m.id == placeholder) {
            Some(message) => message.state = state,
            None => {
                let mut message = ChatMessage::placeholder();
                message.state = state;
                self.messages.push(message);
            }
        }
        self.outcome = Some(settled);
        settled
    }
}

#[cfg(test)]
mod tests {
    use proto::{MessageContent, Role, find_model};
    use serde_json::json;

    use super::*;

    fn zephyr() -> &'static ModelDescriptor {
        find_model("HuggingFaceH4/zephyr-7b-beta").expect("catalog model")
    }

    #[test]
    fn key_plausibility_requires_more_than_ten_chars() {
        assert!(!is_plausible_api_key("hf_short"));
        assert!(!is_plausible_api_key("0123456789"));
        assert!(is_plausible_api_key("01234567890"));
        assert!(is_plausible_api_key("sk-not-hugging-face"));
    }

    #[test]
    fn welcome_text_is_phrased_per_category() {
        let sentiment = find_model("cardiffnlp/twitter-roberta-base-sentiment").expect("model");
        assert!(welcome_text(Some(sentiment)).contains("sentiment analysis"));
        assert!(welcome_text(Some(sentiment)).contains("RoBERTa Sentiment"));
        assert!(welcome_text(None).contains("Choose a model"));
    }

    #[test]
    fn start_appends_user_message_and_placeholder() {
        let mut conv = Conversation::default();
        let pending = conv
            .start(None, zephyr(), "hi", "hf_1234567890", GenerationParams::default())
            .expect("start");

        let messages = conv.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].id, pending.placeholder);
        assert!(messages[1].is_pending());
        assert!(conv.is_loading());
        assert_eq!(conv.send_phase(), Some(ChatPhase::Sending));
    }

    #[test]
    fn second_start_while_outstanding_is_rejected() {
        let mut conv = Conversation::default();
        conv.start(None, zephyr(), "one", "hf_1234567890", GenerationParams::default())
            .expect("first start");
        let err = conv
            .start(None, zephyr(), "two", "hf_1234567890", GenerationParams::default())
            .expect_err("second start must be rejected");
        assert_eq!(err, SendBlocked::RequestInFlight);
        assert_eq!(conv.messages().len(), 2);
    }

    #[test]
    fn failed_settle_replaces_placeholder_with_busy_message() {
        let mut conv = Conversation::default();
        let pending = conv
            .start(None, zephyr(), "hi", "hf_1234567890", GenerationParams::default())
            .expect("start");
        let settled = conv.settle(
            pending.placeholder,
            Err(InferenceError::Network("refused".to_string())),
            Duration::from_secs(5),
        );

        assert_eq!(settled, SendSettled::Failed);
        assert_eq!(conv.messages()[1].text(), SERVER_BUSY_MESSAGE);
        assert!(!conv.is_loading());
        assert!(!conv.is_generating());
        assert_eq!(conv.send_phase(), Some(ChatPhase::Failed));
    }

    #[test]
    fn successful_settle_keeps_generating_for_the_delay() {
        let mut conv = Conversation::default();
        let pending = conv
            .start(None, zephyr(), "hi", "hf_1234567890", GenerationParams::default())
            .expect("start");
        conv.mark_dispatched(pending.placeholder);
        assert_eq!(conv.send_phase(), Some(ChatPhase::AwaitingResponse));

        conv.settle(
            pending.placeholder,
            Ok(json!({"response": "hello!"})),
            Duration::from_secs(60),
        );
        assert!(!conv.is_loading());
        assert!(conv.is_generating());
        assert_eq!(
            conv.messages()[1].content(),
            Some(&MessageContent::Markdown("hello!".to_string()))
        );
    }

    #[test]
    fn reply_after_reset_is_stale() {
        let mut conv = Conversation::default();
        let pending = conv
            .start(None, zephyr(), "hi", "hf_1234567890", GenerationParams::default())
            .expect("start");
        conv.reset(Some("welcome".to_string()));

        let settled = conv.settle(
            pending.placeholder,
            Ok(json!({"response": "late"})),
            Duration::ZERO,
        );
        assert_eq!(settled, SendSettled::Stale);
        assert_eq!(conv.messages().len(), 1);
        assert_eq!(conv.messages()[0].text(), "welcome");
    }
}
