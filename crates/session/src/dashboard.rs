//! Multi-session controller behind the signed-in dashboard.

use chrono::{DateTime, Utc};
use inference::InferenceBackend;
use proto::{
    ChatMessage, InferenceError, MessageContent, MessageId, ModelCategory, ModelDescriptor,
    SessionError, SessionId, find_model,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::ChatSettings;
use crate::conversation::{
    ChatPhase, Conversation, PendingSend, SendBlocked, SendSettled, is_plausible_api_key,
    welcome_text,
};
use crate::key_store::ApiKeyStore;

/// Title every chat starts with.
pub const NEW_CHAT_TITLE: &str = "New Chat";
const TITLE_PREVIEW_CHARS: usize = 30;

/// One named conversation. The greeting is shown above the messages but is
/// not part of them, so it neither locks the model selection nor counts as a
/// prior turn.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: SessionId,
    title: String,
    renamed: bool,
    category: Option<ModelCategory>,
    model: Option<&'static ModelDescriptor>,
    greeting: Option<ChatMessage>,
    conversation: Conversation,
    created_at: DateTime<Utc>,
}

impl ChatSession {
    fn new() -> Self {
        Self {
            id: SessionId::new(),
            title: NEW_CHAT_TITLE.to_string(),
            renamed: false,
            category: None,
            model: None,
            greeting: None,
            conversation: Conversation::default(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn category(&self) -> Option<ModelCategory> {
        self.category
    }

    pub fn model(&self) -> Option<&'static ModelDescriptor> {
        self.model
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Messages exchanged in this chat, without the greeting.
    pub fn messages(&self) -> &[ChatMessage] {
        self.conversation.messages()
    }

    pub fn greeting(&self) -> Option<&ChatMessage> {
        self.greeting.as_ref()
    }

    /// Greeting followed by the messages, in display order.
    pub fn transcript(&self) -> impl Iterator<Item = &ChatMessage> {
        self.greeting.iter().chain(self.conversation.messages())
    }

    /// Model and category are frozen once the chat has any message.
    pub fn is_model_selection_locked(&self) -> bool {
        !self.conversation.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.conversation.is_loading()
    }

    pub fn is_generating(&self) -> bool {
        self.conversation.is_generating()
    }

    fn refresh_greeting(&mut self, key_valid: bool) {
        self.greeting = key_valid
            .then(|| ChatMessage::assistant(MessageContent::Text(welcome_text(self.model))));
    }

    fn derive_title(&mut self, first_user_message: &str) {
        if self.renamed || self.title != NEW_CHAT_TITLE {
            return;
        }
        let preview: String = first_user_message.chars().take(TITLE_PREVIEW_CHARS).collect();
        self.title = if first_user_message.chars().count() > TITLE_PREVIEW_CHARS {
            format!("{preview}...")
        } else {
            preview
        };
    }
}

/// Dashboard chat list with one active chat at a time.
pub struct DashboardController {
    key_store: ApiKeyStore,
    api_key: String,
    key_valid: bool,
    sessions: Vec<ChatSession>,
    active: Option<SessionId>,
    settings: ChatSettings,
}

impl DashboardController {
    /// Creates the controller. A previously stored key is validated straight
    /// away.
    pub fn new(key_store: ApiKeyStore, settings: ChatSettings) -> Self {
        let api_key = key_store.load();
        let mut controller = Self {
            key_store,
            api_key,
            key_valid: false,
            sessions: Vec::new(),
            active: None,
            settings,
        };
        if !controller.api_key.is_empty() {
            controller.validate_api_key(None);
        }
        controller
    }

    pub fn is_demo(&self) -> bool {
        false
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

    /// Replaces the typed key; it must be validated again. The active chat is
    /// reset.
    pub fn set_api_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        if key == self.api_key {
            return;
        }
        self.api_key = key;
        self.key_valid = false;
        if let Some(id) = self.active.clone() {
            self.reset_chat(&id);
        }
        self.refresh_greetings();
    }

    /// Same rules as the demo: more than ten characters, persisted verbatim.
    /// A key that differs from the active one resets the active chat.
    pub fn validate_api_key(&mut self, candidate: Option<&str>) -> bool {
        let key = candidate.unwrap_or(&self.api_key).to_string();
        if !is_plausible_api_key(&key) {
            debug!(len = %key.chars().count(), "Rejected API key");
            self.key_valid = false;
            self.refresh_greetings();
            return false;
        }
        if !key.starts_with("hf") {
            warn!("API key does not look like a Hugging Face token; accepting anyway");
        }
        if let Err(e) = self.key_store.save(&key) {
            warn!(error = %e, "Could not persist API key");
        }
        let changed = key != self.api_key;
        self.api_key = key;
        self.key_valid = true;
        if changed && let Some(id) = self.active.clone() {
            self.reset_chat(&id);
            debug!(chat = %id, "Key changed, active chat reset");
        }
        self.refresh_greetings();
        info!(demo = false, "API key validated");
        true
    }

    pub fn forget_api_key(&mut self) {
        if let Err(e) = self.key_store.clear() {
            warn!(error = %e, "Could not clear stored API key");
        }
        self.api_key.clear();
        self.key_valid = false;
        if let Some(id) = self.active.clone() {
            self.reset_chat(&id);
        }
        self.refresh_greetings();
    }

    fn refresh_greetings(&mut self) {
        let key_valid = self.key_valid;
        for chat in &mut self.sessions {
            chat.refresh_greeting(key_valid);
        }
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn chat(&self, id: &SessionId) -> Option<&ChatSession> {
        self.sessions.iter().find(|c| &c.id == id)
    }

    fn chat_mut(&mut self, id: &SessionId) -> Result<&mut ChatSession, SessionError> {
        self.sessions
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| SessionError::ChatNotFound(id.to_string()))
    }

    pub fn active_chat_id(&self) -> Option<&SessionId> {
        self.active.as_ref()
    }

    pub fn active_chat(&self) -> Option<&ChatSession> {
        self.active.as_ref().and_then(|id| self.chat(id))
    }

    /// Adds an empty chat at the top of the list and makes it active.
    pub fn create_new_chat(&mut self) -> SessionId {
        let mut chat = ChatSession::new();
        chat.refresh_greeting(self.key_valid);
        let id = chat.id.clone();
        self.sessions.insert(0, chat);
        self.active = Some(id.clone());
        debug!(chat = %id, total = %self.sessions.len(), "Created chat");
        id
    }

    pub fn select_chat(&mut self, id: &SessionId) -> Result<(), SessionError> {
        if self.chat(id).is_none() {
            return Err(SessionError::ChatNotFound(id.to_string()));
        }
        self.active = Some(id.clone());
        Ok(())
    }

    /// Removes a chat. Deleting the active chat activates the first remaining
    /// one, or none.
    pub fn delete_chat(&mut self, id: &SessionId) -> Result<(), SessionError> {
        let index = self
            .sessions
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| SessionError::ChatNotFound(id.to_string()))?;
        self.sessions.remove(index);
        if self.active.as_ref() == Some(id) {
            self.active = self.sessions.first().map(|c| c.id.clone());
        }
        debug!(chat = %id, remaining = %self.sessions.len(), "Deleted chat");
        Ok(())
    }

    /// Sets an explicit title; blank titles are ignored.
    pub fn rename_chat(&mut self, id: &SessionId, title: &str) -> Result<(), SessionError> {
        let chat = self.chat_mut(id)?;
        let title = title.trim();
        if title.is_empty() {
            return Ok(());
        }
        chat.title = title.to_string();
        chat.renamed = true;
        Ok(())
    }

    /// Empties the chat and restores its default title.
    pub fn clear_chat(&mut self, id: &SessionId) -> Result<(), SessionError> {
        self.chat_mut(id)?;
        self.reset_chat(id);
        Ok(())
    }

    fn reset_chat(&mut self, id: &SessionId) {
        let key_valid = self.key_valid;
        if let Ok(chat) = self.chat_mut(id) {
            chat.conversation.reset(None);
            chat.title = NEW_CHAT_TITLE.to_string();
            chat.renamed = false;
            chat.refresh_greeting(key_valid);
        }
    }

    pub fn is_model_selection_locked(&self, id: &SessionId) -> bool {
        self.chat(id).is_some_and(ChatSession::is_model_selection_locked)
    }

    /// Models selectable under the chat's category (all models when none is
    /// chosen yet).
    pub fn filtered_models(&self, id: &SessionId) -> Vec<&'static ModelDescriptor> {
        match self.chat(id).and_then(ChatSession::category) {
            Some(category) => proto::models_for(category).collect(),
            None => proto::model_options().iter().collect(),
        }
    }

    /// Changes the chat's category. No-op (returns `false`) while locked or
    /// when unchanged.
    pub fn set_model_category(
        &mut self,
        id: &SessionId,
        category: ModelCategory,
    ) -> Result<bool, SessionError> {
        let key_valid = self.key_valid;
        let chat = self.chat_mut(id)?;
        if chat.is_model_selection_locked() || chat.category == Some(category) {
            return Ok(false);
        }
        chat.category = Some(category);
        if chat.model.is_some_and(|m| m.category != category) {
            chat.model = None;
        }
        chat.refresh_greeting(key_valid);
        Ok(true)
    }

    /// Selects a model. The chat adopts the model's category when it has none;
    /// a model from another category is rejected. No-op while locked.
    pub fn set_model(&mut self, id: &SessionId, model_id: &str) -> Result<bool, SessionError> {
        let model =
            find_model(model_id).ok_or_else(|| SessionError::UnknownModel(model_id.to_string()))?;
        let key_valid = self.key_valid;
        let chat = self.chat_mut(id)?;
        if chat.is_model_selection_locked() {
            return Ok(false);
        }
        match chat.category {
            Some(category) if category != model.category => {
                return Err(SessionError::ModelCategoryMismatch {
                    model: model_id.to_string(),
                    category: category.to_string(),
                });
            }
            Some(_) => {}
            None => chat.category = Some(model.category),
        }
        if chat.model.is_some_and(|m| m.id == model.id) {
            return Ok(false);
        }
        chat.model = Some(model);
        chat.refresh_greeting(key_valid);
        Ok(true)
    }

    pub fn phase(&self, id: &SessionId) -> ChatPhase {
        let send_phase = self.chat(id).and_then(|c| c.conversation.send_phase());
        if let Some(phase) = send_phase {
            return phase;
        }
        let model = self.chat(id).and_then(ChatSession::model);
        match (self.key_valid, model) {
            (true, Some(_)) => ChatPhase::ModelSelected,
            (true, None) => ChatPhase::KeyValidated,
            (false, _) if !self.api_key.is_empty() => ChatPhase::KeyPending,
            _ => ChatPhase::Idle,
        }
    }

    /// Starts a send in chat `id`. The first user message names an untitled
    /// chat.
    pub fn begin_send(&mut self, id: &SessionId, content: &str) -> Result<PendingSend, SendBlocked> {
        if content.trim().is_empty() {
            return Err(SendBlocked::EmptyMessage);
        }
        if !self.key_valid {
            return Err(SendBlocked::KeyNotValidated);
        }
        let api_key = self.api_key.clone();
        let params = self.settings.params;
        let chat = self.chat_mut(id).map_err(|_| SendBlocked::UnknownChat)?;
        let Some(model) = chat.model else {
            return Err(SendBlocked::NoModelSelected);
        };

        let first_turn = chat.conversation.user_turns() == 0;
        let pending = chat
            .conversation
            .start(Some(chat.id.clone()), model, content, &api_key, params)?;
        if first_turn {
            chat.derive_title(content);
        }
        debug!(chat = %id, model = %model.id, "Dashboard send started");
        Ok(pending)
    }

    pub fn mark_dispatched(&mut self, id: &SessionId, placeholder: MessageId) {
        if let Ok(chat) = self.chat_mut(id) {
            chat.conversation.mark_dispatched(placeholder);
        }
    }

    /// Feeds a proxy result back. Replies for deleted chats are discarded.
    pub fn complete_send(
        &mut self,
        id: &SessionId,
        placeholder: MessageId,
        result: Result<Value, InferenceError>,
    ) -> SendSettled {
        let delay = self.settings.generation_delay;
        match self.chat_mut(id) {
            Ok(chat) => chat.conversation.settle(placeholder, result, delay),
            Err(_) => {
                debug!(chat = %id, "Reply for deleted chat discarded");
                SendSettled::Stale
            }
        }
    }

    pub async fn send_message(
        &mut self,
        backend: &dyn InferenceBackend,
        id: &SessionId,
        content: &str,
    ) -> Result<SendSettled, SendBlocked> {
        let pending = self.begin_send(id, content)?;
        self.mark_dispatched(id, pending.placeholder);
        let result = backend.infer(pending.request).await;
        Ok(self.complete_send(id, pending.placeholder, result))
    }
}
