//! Locally synthesized replies used when the proxy returns nothing usable.

use proto::{MessageContent, ModelCategory, SentimentScore, SentimentSummary};
use rand::Rng;

const SENTIMENTS: [&str; 3] = ["Positive", "Negative", "Neutral"];

const CREATIVE_OPENING: &str = "Once upon a time in a digital realm, AI and humans worked together to create amazing stories. Your journey begins now...";

/// Category-appropriate stand-in that echoes `input`.
pub fn fallback(category: ModelCategory, input: &str, rng: &mut impl Rng) -> MessageContent {
    match category {
        ModelCategory::Sentiment => MessageContent::Sentiment(sentiment(rng)),
        ModelCategory::Creative => MessageContent::Markdown(creative(input)),
        ModelCategory::Conversation => MessageContent::Markdown(conversation(input)),
    }
}

fn creative(input: &str) -> String {
    let body = if input.chars().count() > 20 {
        input
    } else {
        CREATIVE_OPENING
    };
    format!(
        "# Creative Response\n\n{body}\n\nFeel free to ask for more creative content or provide more specific prompts!"
    )
}

fn conversation(input: &str) -> String {
    let head: String = input.chars().take(30).collect();
    let ellipsis = if input.chars().count() > 30 { "..." } else { "" };
    format!(
        "# Response\n\nI understand you're asking about \"{head}{ellipsis}\".\n\nAs an AI assistant, I'm here to help with information and answers. What specific aspects would you like me to elaborate on?"
    )
}

fn sentiment(rng: &mut impl Rng) -> SentimentSummary {
    let primary = rng.gen_range(0..SENTIMENTS.len());
    let confidence = format!("{:.2}%", rng.gen_range(70.0..100.0));
    let second = format!("{:.2}%", rng.gen_range(10.0..30.0));
    let third = format!("{:.2}%", rng.gen_range(0.0..10.0));
    let label = SENTIMENTS[primary];

    SentimentSummary {
        primary_sentiment: SentimentScore {
            label: label.to_string(),
            confidence: confidence.clone(),
        },
        all_sentiments: vec![
            SentimentScore {
                label: label.to_string(),
                confidence,
            },
            SentimentScore {
                label: SENTIMENTS[(primary + 1) % 3].to_string(),
                confidence: second,
            },
            SentimentScore {
                label: SENTIMENTS[(primary + 2) % 3].to_string(),
                confidence: third,
            },
        ],
        interpretation: format!(
            "The text you provided appears to have a {} sentiment. This analysis is based on the language patterns, word choice, and overall tone detected in your message.",
            label.to_lowercase()
        ),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn short_creative_prompt_gets_canned_opening() {
        let text = creative("a poem");
        assert!(text.starts_with("# Creative Response"));
        assert!(text.contains(CREATIVE_OPENING));
    }

    #[test]
    fn long_creative_prompt_is_echoed() {
        let prompt = "Write a story about a lighthouse keeper";
        assert!(creative(prompt).contains(prompt));
    }

    #[test]
    fn conversation_echo_is_truncated_to_thirty_chars() {
        let text = conversation("Tell me everything about the history of the Roman empire");
        assert!(text.contains("\"Tell me everything about the h...\""));
    }

    #[test]
    fn sentiment_mock_ranks_three_distinct_labels() {
        let mut rng = StdRng::seed_from_u64(42);
        let summary = sentiment(&mut rng);
        let mut labels: Vec<_> = summary.all_sentiments.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels[0], summary.primary_sentiment.label);
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), 3);
    }
}
