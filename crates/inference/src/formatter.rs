//! Turns raw proxy responses into renderable message content.
//!
//! Formatting runs in two steps. [`decode`] classifies the untyped JSON into a
//! [`DecodedResponse`]; [`format_decoded`] turns that into [`MessageContent`],
//! substituting a local mock when nothing usable came back.

use proto::{MessageContent, ModelCategory, SentimentScore, SentimentSummary};
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::mock;

pub const UNPARSED_SENTIMENT: &str = "Unable to parse sentiment results.";
pub const UNEXPECTED_SENTIMENT_SHAPE: &str = "Unexpected sentiment result format.";

/// A single classifier output entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Outcome of decoding a sentiment classifier response.
#[derive(Debug, Clone, PartialEq)]
pub enum SentimentDecode {
    /// Valid entries, sorted by score descending.
    Ranked(Vec<LabelScore>),
    /// The result array existed but held no `{label, score}` entries.
    NoValidScores,
    /// The result array did not nest a list of entries.
    UnexpectedShape,
}

/// Typed view of a proxy response.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResponse {
    Sentiment(SentimentDecode),
    Text(String),
    Empty,
}

/// Classifies `raw` according to the category it was produced for.
pub fn decode(category: ModelCategory, raw: &Value) -> DecodedResponse {
    if category == ModelCategory::Sentiment
        && let Some(outer) = sentiment_rows(raw)
    {
        return DecodedResponse::Sentiment(decode_sentiment(outer));
    }

    let text = match category {
        ModelCategory::Conversation => conversation_text(raw),
        ModelCategory::Creative => creative_text(raw),
        ModelCategory::Sentiment => string_field(raw, "result").or_else(|| string_field(raw, "data")),
    };

    match text {
        Some(text) if !text.trim().is_empty() => DecodedResponse::Text(text),
        _ => DecodedResponse::Empty,
    }
}

/// Formats a raw response using the thread-local RNG for mock fallbacks.
pub fn format_response(raw: &Value, category: ModelCategory, input: &str) -> MessageContent {
    format_decoded(decode(category, raw), category, input, &mut rand::thread_rng())
}

/// Formats an already decoded response. `rng` only feeds the sentiment mock.
pub fn format_decoded(
    decoded: DecodedResponse,
    category: ModelCategory,
    input: &str,
    rng: &mut impl Rng,
) -> MessageContent {
    match decoded {
        DecodedResponse::Sentiment(SentimentDecode::Ranked(scores)) => {
            MessageContent::Sentiment(summarize(&scores))
        }
        DecodedResponse::Sentiment(SentimentDecode::NoValidScores) => {
            MessageContent::Sentiment(SentimentSummary::unparsed(UNPARSED_SENTIMENT))
        }
        DecodedResponse::Sentiment(SentimentDecode::UnexpectedShape) => {
            MessageContent::Sentiment(SentimentSummary::unparsed(UNEXPECTED_SENTIMENT_SHAPE))
        }
        DecodedResponse::Text(text) => MessageContent::Markdown(text),
        DecodedResponse::Empty => {
            debug!(category = %category, "Empty inference result, using local fallback");
            mock::fallback(category, input, rng)
        }
    }
}

/// `0.98123` → `"98.12%"`.
pub fn format_confidence(score: f64) -> String {
    format!("{:.2}%", score * 100.0)
}

fn summarize(scores: &[LabelScore]) -> SentimentSummary {
    let Some(top) = scores.first() else {
        return SentimentSummary::unparsed(UNPARSED_SENTIMENT);
    };
    SentimentSummary {
        primary_sentiment: SentimentScore {
            label: top.label.clone(),
            confidence: format_confidence(top.score),
        },
        all_sentiments: scores
            .iter()
            .map(|s| SentimentScore {
                label: s.label.clone(),
                confidence: format_confidence(s.score),
            })
            .collect(),
        interpretation: format!(
            "The text you provided appears to have a predominantly {} sentiment.",
            top.label.to_lowercase()
        ),
    }
}

// ── Sentiment decoding ─────────────────────────────────────────────────────────

fn sentiment_rows(raw: &Value) -> Option<&Vec<Value>> {
    match raw {
        Value::Array(rows) => Some(rows),
        Value::Object(map) => map.get("result").and_then(Value::as_array),
        _ => None,
    }
}

fn decode_sentiment(outer: &[Value]) -> SentimentDecode {
    let Some(Value::Array(entries)) = outer.first() else {
        return SentimentDecode::UnexpectedShape;
    };

    let mut scores: Vec<LabelScore> = entries
        .iter()
        .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
        .filter(|s: &LabelScore| s.score.is_finite())
        .collect();

    if scores.is_empty() {
        return SentimentDecode::NoValidScores;
    }
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    SentimentDecode::Ranked(scores)
}

// ── Text decoding ──────────────────────────────────────────────────────────────

fn string_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

fn generated_text(raw: &Value) -> Option<String> {
    string_field(raw, "generated_text").or_else(|| {
        raw.as_array()
            .and_then(|items| items.first())
            .and_then(|first| string_field(first, "generated_text"))
    })
}

fn stringify(raw: &Value) -> Option<String> {
    match raw {
        Value::Object(map) if !map.is_empty() => serde_json::to_string(raw).ok(),
        Value::Array(items) if !items.is_empty() => serde_json::to_string(raw).ok(),
        _ => None,
    }
}

fn creative_text(raw: &Value) -> Option<String> {
    if let Some(text) = raw.as_str() {
        return Some(text.to_string());
    }
    string_field(raw, "result")
        .or_else(|| string_field(raw, "data"))
        .or_else(|| generated_text(raw))
        .or_else(|| string_field(raw, "response"))
        .or_else(|| stringify(raw))
}

fn conversation_text(raw: &Value) -> Option<String> {
    if let Some(text) = raw.as_str() {
        return Some(text.to_string());
    }
    string_field(raw, "response")
        .or_else(|| {
            raw.pointer("/conversation/generated_responses")
                .and_then(Value::as_array)
                .and_then(|responses| responses.last())
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .or_else(|| generated_text(raw))
        .or_else(|| string_field(raw, "result"))
        .or_else(|| string_field(raw, "data"))
        .or_else(|| stringify(raw))
}
