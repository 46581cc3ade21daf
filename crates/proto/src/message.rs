use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a chat session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Creates a new random session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the raw session identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a chat message. Random, so a late response can never
/// land on a placeholder created after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message authored by the end user.
    User,
    /// Message produced by the model (or a local fallback).
    Assistant,
    /// Local notice that is not part of the model conversation.
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = crate::error::ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            other => Err(crate::error::ProtoError::InvalidRole(other.to_string())),
        }
    }
}

/// One ranked sentiment label with its confidence rendered as a percentage
/// string (`"98.12%"`, or `"N/A"` when unknown).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub label: String,
    pub confidence: String,
}

/// Structured sentiment-analysis result shown instead of free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentSummary {
    pub primary_sentiment: SentimentScore,
    pub all_sentiments: Vec<SentimentScore>,
    pub interpretation: String,
}

impl SentimentSummary {
    /// Summary used when the model output could not be interpreted.
    pub fn unparsed(interpretation: impl Into<String>) -> Self {
        Self {
            primary_sentiment: SentimentScore {
                label: "Unknown".to_string(),
                confidence: "N/A".to_string(),
            },
            all_sentiments: Vec::new(),
            interpretation: interpretation.into(),
        }
    }
}

/// Renderable body of a settled message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum MessageContent {
    Text(String),
    Markdown(String),
    Sentiment(SentimentSummary),
}

impl MessageContent {
    /// Flattens the content to plain text, e.g. for conversation history.
    pub fn as_plain_text(&self) -> String {
        match self {
            MessageContent::Text(text) | MessageContent::Markdown(text) => text.clone(),
            MessageContent::Sentiment(summary) => format!(
                "Sentiment: {} ({})\n{}",
                summary.primary_sentiment.label,
                summary.primary_sentiment.confidence,
                summary.interpretation
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MessageContent::Text(text) | MessageContent::Markdown(text) => text.trim().is_empty(),
            MessageContent::Sentiment(_) => false,
        }
    }
}

/// Lifecycle of a message body. Assistant replies start `Pending` and move
/// exactly once to `Resolved` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum MessageState {
    Pending,
    Resolved(MessageContent),
    Failed(String),
}

/// A single chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message id.
    pub id: MessageId,
    /// Author of this turn.
    pub role: Role,
    /// Body lifecycle state.
    pub state: MessageState,
    /// Creation timestamp in UTC.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn with_state(role: Role, state: MessageState) -> Self {
        Self {
            id: MessageId::new(),
            role,
            state,
            timestamp: Utc::now(),
        }
    }

    /// Plain-text message typed by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self::with_state(Role::User, MessageState::Resolved(MessageContent::Text(text.into())))
    }

    /// Settled assistant message.
    pub fn assistant(content: MessageContent) -> Self {
        Self::with_state(Role::Assistant, MessageState::Resolved(content))
    }

    /// Assistant placeholder awaiting a response.
    pub fn placeholder() -> Self {
        Self::with_state(Role::Assistant, MessageState::Pending)
    }

    /// Assistant message carrying a user-facing error.
    pub fn failed(error: impl Into<String>) -> Self {
        Self::with_state(Role::Assistant, MessageState::Failed(error.into()))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, MessageState::Pending)
    }

    /// Plain-text view of the body; empty while pending.
    pub fn text(&self) -> String {
        match &self.state {
            MessageState::Pending => String::new(),
            MessageState::Resolved(content) => content.as_plain_text(),
            MessageState::Failed(error) => error.clone(),
        }
    }

    /// Settled content, if any.
    pub fn content(&self) -> Option<&MessageContent> {
        match &self.state {
            MessageState::Resolved(content) => Some(content),
            _ => None,
        }
    }
}
