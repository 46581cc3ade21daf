//! Model categories and the built-in model catalog.

use serde::{Deserialize, Serialize};

use crate::error::ProtoError;

/// Task family a model belongs to. Selects the inference endpoint and the
/// response formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelCategory {
    #[default]
    Conversation,
    Creative,
    Sentiment,
}

impl ModelCategory {
    /// All categories in display order.
    pub const ALL: [ModelCategory; 3] = [
        ModelCategory::Conversation,
        ModelCategory::Creative,
        ModelCategory::Sentiment,
    ];

    /// Wire name, also the last path segment of the inference endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelCategory::Conversation => "conversation",
            ModelCategory::Creative => "creative",
            ModelCategory::Sentiment => "sentiment",
        }
    }

    /// Human-readable label for selectors.
    pub fn label(self) -> &'static str {
        match self {
            ModelCategory::Conversation => "Conversational",
            ModelCategory::Creative => "Creative Writing",
            ModelCategory::Sentiment => "Sentiment Analysis",
        }
    }

    /// Next category in display order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            ModelCategory::Conversation => ModelCategory::Creative,
            ModelCategory::Creative => ModelCategory::Sentiment,
            ModelCategory::Sentiment => ModelCategory::Conversation,
        }
    }

    /// Previous category in display order, wrapping around.
    pub fn prev(self) -> Self {
        match self {
            ModelCategory::Conversation => ModelCategory::Sentiment,
            ModelCategory::Creative => ModelCategory::Conversation,
            ModelCategory::Sentiment => ModelCategory::Creative,
        }
    }
}

impl std::fmt::Display for ModelCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModelCategory {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conversation" | "conversational" | "chat" => Ok(ModelCategory::Conversation),
            "creative" => Ok(ModelCategory::Creative),
            "sentiment" => Ok(ModelCategory::Sentiment),
            other => Err(ProtoError::InvalidCategory(other.to_string())),
        }
    }
}

/// Immutable description of a selectable model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub category: ModelCategory,
    pub description: &'static str,
}

const MODEL_OPTIONS: &[ModelDescriptor] = &[
    ModelDescriptor {
        id: "Qwen/Qwen1.5-0.5B-Chat",
        name: "Qwen 0.5B Chat",
        category: ModelCategory::Conversation,
        description: "Efficient 0.5B parameter model with markdown support and good conversation abilities",
    },
    ModelDescriptor {
        id: "HuggingFaceH4/zephyr-7b-beta",
        name: "Zephyr 7B Beta",
        category: ModelCategory::Conversation,
        description: "Optimized 7B model with excellent markdown support and conversational abilities",
    },
    ModelDescriptor {
        id: "microsoft/Phi-3-mini-4k-instruct",
        name: "Phi-3 Mini (3.8B)",
        category: ModelCategory::Creative,
        description: "Best balance of size (3.8B) and quality. Perfect for Markdown stories, dialogue, and worldbuilding.",
    },
    ModelDescriptor {
        id: "Qwen/Qwen1.5-0.5B-Chat-creative",
        name: "Qwen 0.5B Chat",
        category: ModelCategory::Creative,
        description: "Tiny but surprisingly good at Markdown formatting for short stories.",
    },
    ModelDescriptor {
        id: "facebook/opt-1.3b",
        name: "OPT 1.3B",
        category: ModelCategory::Creative,
        description: "Meta's 1.3B parameter model offering a good balance of quality and efficiency for creative writing tasks",
    },
    ModelDescriptor {
        id: "distilbert-base-uncased-finetuned-sst-2-english",
        name: "DistilBERT Sentiment",
        category: ModelCategory::Sentiment,
        description: "Lightweight sentiment analysis model (66M parameters) with basic markdown",
    },
    ModelDescriptor {
        id: "cardiffnlp/twitter-roberta-base-sentiment",
        name: "RoBERTa Sentiment",
        category: ModelCategory::Sentiment,
        description: "125M parameter model fine-tuned for sentiment analysis with markdown output",
    },
];

/// Full catalog in display order.
pub fn model_options() -> &'static [ModelDescriptor] {
    MODEL_OPTIONS
}

/// Catalog entries belonging to `category`, in display order.
pub fn models_for(category: ModelCategory) -> impl Iterator<Item = &'static ModelDescriptor> {
    MODEL_OPTIONS.iter().filter(move |m| m.category == category)
}

/// Looks up a catalog entry by exact id.
pub fn find_model(id: &str) -> Option<&'static ModelDescriptor> {
    MODEL_OPTIONS.iter().find(|m| m.id == id)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn every_category_has_at_least_one_model() {
        for category in ModelCategory::ALL {
            assert!(
                models_for(category).next().is_some(),
                "category {category} should have models"
            );
        }
    }

    #[test]
    fn models_for_only_yields_matching_category() {
        let sentiment: Vec<_> = models_for(ModelCategory::Sentiment).collect();
        assert_eq!(sentiment.len(), 2);
        assert!(sentiment.iter().all(|m| m.category == ModelCategory::Sentiment));
    }

    #[test]
    fn catalog_ids_are_unique() {
        let mut ids: Vec<_> = model_options().iter().map(|m| m.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), model_options().len());
    }

    #[test]
    fn find_model_returns_none_for_unknown_id() {
        assert!(find_model("openai/gpt-9").is_none());
        assert_eq!(
            find_model("facebook/opt-1.3b").map(|m| m.category),
            Some(ModelCategory::Creative)
        );
    }

    #[test]
    fn category_parse_accepts_aliases_and_rejects_unknown() {
        assert_eq!(
            ModelCategory::from_str("Conversational").expect("alias should parse"),
            ModelCategory::Conversation
        );
        let err = ModelCategory::from_str("poetry").expect_err("unknown category");
        assert!(matches!(err, ProtoError::InvalidCategory(v) if v == "poetry"));
    }

    #[test]
    fn next_and_prev_cycle_through_all_categories() {
        let mut category = ModelCategory::Conversation;
        for _ in 0..3 {
            category = category.next();
        }
        assert_eq!(category, ModelCategory::Conversation);
        assert_eq!(ModelCategory::Conversation.prev(), ModelCategory::Sentiment);
    }
}
