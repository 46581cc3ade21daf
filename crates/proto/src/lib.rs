//! Shared types for the genai chat client.
//!
//! This crate defines chat messages, the model catalog and the
//! strongly-typed error enums shared across the workspace.

pub mod error;
pub mod message;
pub mod model;

/// Re-export of all error types.
pub use error::*;
/// Re-export of chat message types.
pub use message::{
    ChatMessage, MessageContent, MessageId, MessageState, Role, SentimentScore, SentimentSummary,
    SessionId,
};
/// Re-export of model catalog types.
pub use model::{ModelCategory, ModelDescriptor, find_model, model_options, models_for};

/// Base URL without trailing slashes, ready for `format!("{base}/path")`.
pub fn trim_base_url(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}
