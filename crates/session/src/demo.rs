//! Single-conversation controller behind the public demo.

use std::sync::Arc;

use inference::InferenceBackend;
use proto::{ChatMessage, MessageId, ModelCategory, ModelDescriptor, SessionError, find_model};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::ChatSettings;
use crate::conversation::{
    ChatPhase, Conversation, PendingSend, SendBlocked, SendSettled, is_plausible_api_key,
    welcome_text,
};
use crate::key_store::ApiKeyStore;
use crate::storage::LocalStorage;

/// Storage key of the signed-out send count kept across one-shot runs.
pub const DEMO_SENDS_STORAGE_KEY: &str = "genai-demo-sends";

/// Demo chat: one conversation, free sends capped until the user signs in.
pub struct DemoController {
    key_store: ApiKeyStore,
    api_key: String,
    key_valid: bool,
    category: ModelCategory,
    model: Option<&'static ModelDescriptor>,
    conversation: Conversation,
    sends: usize,
    send_counter: Option<Arc<dyn LocalStorage>>,
    authenticated: bool,
    login_requested: bool,
    settings: ChatSettings,
}

impl DemoController {
    /// Creates the controller with the stored key pre-filled but not yet
    /// validated.
    pub fn new(key_store: ApiKeyStore, settings: ChatSettings) -> Self {
        let api_key = key_store.load();
        Self {
            key_store,
            api_key,
            key_valid: false,
            category: ModelCategory::default(),
            model: None,
            conversation: Conversation::default(),
            sends: 0,
            send_counter: None,
            authenticated: false,
            login_requested: false,
            settings,
        }
    }

    /// Keeps the free-send count in `storage` so the ceiling holds across
    /// separate runs. An unreadable or malformed count starts from zero.
    pub fn with_persisted_sends(mut self, storage: Arc<dyn LocalStorage>) -> Self {
        self.sends = match storage.get_item(DEMO_SENDS_STORAGE_KEY) {
            Ok(value) => value.and_then(|v| v.trim().parse().ok()).unwrap_or(0),
            Err(e) => {
                warn!(error = %e, "Send count unreadable, starting from zero");
                0
            }
        };
        self.send_counter = Some(storage);
        self
    }

    pub fn is_demo(&self) -> bool {
        true
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn is_key_valid(&self) -> bool {
        self.key_valid
    }

    pub fn has_existing_key(&self) -> bool {
        self.key_store.has_existing_key()
    }

    /// Replaces the typed key. A different key must be validated again and
    /// resets the conversation.
    pub fn set_api_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        if key == self.api_key {
            return;
        }
        self.api_key = key;
        self.key_valid = false;
        self.clear_chat();
    }

    /// Validates `candidate` (or the typed key). Valid keys are persisted;
    /// invalid keys change nothing else.
    pub fn validate_api_key(&mut self, candidate: Option<&str>) -> bool {
        let key = candidate.unwrap_or(&self.api_key).to_string();
        self.accept_key(key, true)
    }

    /// Validates `key` for this run only. The stored key is left untouched.
    pub fn use_api_key(&mut self, key: &str) -> bool {
        self.accept_key(key.to_string(), false)
    }

    /// A key that differs from the active one resets the conversation to a
    /// fresh welcome; re-validating the same key only seeds an empty chat.
    fn accept_key(&mut self, key: String, persist: bool) -> bool {
        if !is_plausible_api_key(&key) {
            debug!(len = %key.chars().count(), "Rejected API key");
            self.key_valid = false;
            return false;
        }
        if !key.starts_with("hf") {
            warn!("API key does not look like a Hugging Face token; accepting anyway");
        }

        if persist && let Err(e) = self.key_store.save(&key) {
            warn!(error = %e, "Could not persist API key");
        }
        let changed = key != self.api_key;
        self.api_key = key;
        self.key_valid = true;
        if changed {
            self.clear_chat();
            debug!("Key changed, conversation reset");
        } else if self.conversation.greet_if_empty(welcome_text(self.model)) {
            debug!("Seeded welcome message");
        }
        info!(demo = true, persisted = %persist, "API key validated");
        true
    }

    /// Forgets the stored key and returns to the initial state.
    pub fn forget_api_key(&mut self) {
        if let Err(e) = self.key_store.clear() {
            warn!(error = %e, "Could not clear stored API key");
        }
        self.api_key.clear();
        self.key_valid = false;
        self.clear_chat();
    }

    pub fn category(&self) -> ModelCategory {
        self.category
    }

    /// Models selectable under the current category.
    pub fn filtered_models(&self) -> Vec<&'static ModelDescriptor> {
        proto::models_for(self.category).collect()
    }

    pub fn selected_model(&self) -> Option<&'static ModelDescriptor> {
        self.model
    }

    /// Switches category, dropping a selected model that does not belong to
    /// it. Returns whether anything changed.
    pub fn set_model_category(&mut self, category: ModelCategory) -> bool {
        if category == self.category {
            return false;
        }
        self.category = category;
        if self.model.is_some_and(|m| m.category != category) {
            self.model = None;
        }
        self.clear_chat();
        true
    }

    /// Selects a model of the current category.
    pub fn set_model(&mut self, model_id: &str) -> Result<bool, SessionError> {
        let model =
            find_model(model_id).ok_or_else(|| SessionError::UnknownModel(model_id.to_string()))?;
        if model.category != self.category {
            return Err(SessionError::ModelCategoryMismatch {
                model: model_id.to_string(),
                category: self.category.to_string(),
            });
        }
        if self.model.is_some_and(|m| m.id == model.id) {
            return Ok(false);
        }
        self.model = Some(model);
        self.clear_chat();
        Ok(true)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.conversation.messages()
    }

    /// Empties the conversation; with a valid key a fresh welcome is seeded.
    pub fn clear_chat(&mut self) {
        let greeting = self.key_valid.then(|| welcome_text(self.model));
        self.conversation.reset(greeting);
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Signing in lifts the free-send ceiling.
    pub fn set_authenticated(&mut self, authenticated: bool) {
        self.authenticated = authenticated;
        if authenticated {
            self.login_requested = false;
        }
    }

    /// Returns and resets the "show login" signal raised by the send ceiling.
    pub fn take_login_request(&mut self) -> bool {
        std::mem::take(&mut self.login_requested)
    }

    /// Free sends left before login is required, `None` once signed in.
    pub fn remaining_free_messages(&self) -> Option<usize> {
        (!self.authenticated).then(|| self.settings.demo_message_limit.saturating_sub(self.sends))
    }

    pub fn is_loading(&self) -> bool {
        self.conversation.is_loading()
    }

    pub fn is_generating(&self) -> bool {
        self.conversation.is_generating()
    }

    pub fn phase(&self) -> ChatPhase {
        if let Some(phase) = self.conversation.send_phase() {
            return phase;
        }
        match (self.key_valid, self.model) {
            (true, Some(_)) => ChatPhase::ModelSelected,
            (true, None) => ChatPhase::KeyValidated,
            (false, _) if !self.api_key.is_empty() => ChatPhase::KeyPending,
            _ => ChatPhase::Idle,
        }
    }

    /// Checks preconditions and the usage ceiling, then appends the user
    /// message and a placeholder. The returned request still has to be sent.
    pub fn begin_send(&mut self, content: &str) -> Result<PendingSend, SendBlocked> {
        if content.trim().is_empty() {
            return Err(SendBlocked::EmptyMessage);
        }
        if !self.key_valid {
            return Err(SendBlocked::KeyNotValidated);
        }
        let Some(model) = self.model else {
            return Err(SendBlocked::NoModelSelected);
        };
        if !self.authenticated && self.sends >= self.settings.demo_message_limit {
            info!(limit = %self.settings.demo_message_limit, "Demo limit reached, login required");
            self.login_requested = true;
            return Err(SendBlocked::LoginRequired);
        }

        let pending =
            self.conversation
                .start(None, model, content, &self.api_key, self.settings.params)?;
        self.sends += 1;
        if let Some(storage) = &self.send_counter
            && let Err(e) = storage.set_item(DEMO_SENDS_STORAGE_KEY, &self.sends.to_string())
        {
            warn!(error = %e, "Could not persist send count");
        }
        debug!(model = %model.id, sends = %self.sends, "Demo send started");
        Ok(pending)
    }

    /// Records that the request for `placeholder` is on the wire.
    pub fn mark_dispatched(&mut self, placeholder: MessageId) {
        self.conversation.mark_dispatched(placeholder);
    }

    /// Feeds the proxy result back into the conversation.
    pub fn complete_send(
        &mut self,
        placeholder: MessageId,
        result: Result<Value, proto::InferenceError>,
    ) -> SendSettled {
        self.conversation
            .settle(placeholder, result, self.settings.generation_delay)
    }

    /// Runs a whole send against `backend`.
    pub async fn send_message(
        &mut self,
        backend: &dyn InferenceBackend,
        content: &str,
    ) -> Result<SendSettled, SendBlocked> {
        let pending = self.begin_send(content)?;
        self.mark_dispatched(pending.placeholder);
        let result = backend.infer(pending.request).await;
        Ok(self.complete_send(pending.placeholder, result))
    }
}
