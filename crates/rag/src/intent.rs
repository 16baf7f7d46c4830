//! Question intent classification.
//!
//! An optional LLM classifier is tried first. Any failure there (no client,
//! transport error, unparseable label) falls back to local pattern matching,
//! which is pure and deterministic.

use crate::types::Intent;
use docchat_llm::{LlmClient, LlmRequest};
use regex::Regex;
use std::sync::{Arc, LazyLock};

static SPECULATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(will|would|could|may|might|future|forecast|predict|prediction|next\s+year|next\s+month|next\s+quarter|in\s+20\d{2}|by\s+20\d{2}|over\s+the\s+next|upcoming|roadmap)\b",
    )
    .expect("speculative regex is valid")
});

static FACTUAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(is|are|was|were|did|does|when|where|who|what|which|how\s+many|how\s+much|current|previous|last\s+year|historical|budget|amount)\b",
    )
    .expect("factual regex is valid")
});

static CONVERSATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(this\s+chat|this\s+conversation|previous\s+question|earlier\s+question|my\s+first\s+question|first\s+question|last\s+question|above|earlier\s+in\s+this\s+chat)\b",
    )
    .expect("conversation regex is valid")
});

const CLASSIFIER_SYSTEM: &str = "You are a classifier. Return exactly one label: FACTUAL, FUTURISTIC, or MIXED. \
FACTUAL: answer exists in existing documents or past data. \
FUTURISTIC: asks about future events, predictions, outcomes, or unknown states. \
MIXED: combines factual info with future speculation.";

const CLASSIFIER_MAX_TOKENS: u32 = 5;

/// Labels questions as FACT, FUTURISTIC or MIXED.
pub struct IntentClassifier {
    llm: Option<Arc<dyn LlmClient>>,
    model: String,
}

impl IntentClassifier {
    /// Pattern matching only.
    pub fn local() -> Self {
        Self {
            llm: None,
            model: String::new(),
        }
    }

    /// Try `client` first, fall back to pattern matching.
    pub fn with_llm(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            llm: Some(client),
            model: model.into(),
        }
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    pub async fn classify(&self, question: &str) -> Intent {
        let question = question.trim();
        if question.is_empty() {
            return Intent::Fact;
        }

        if let Some(intent) = self.classify_remote(question).await {
            tracing::debug!("Intent classified by LLM: {}", intent);
            return intent;
        }

        let intent = classify_local(question);
        tracing::debug!("Intent classified by patterns: {}", intent);
        intent
    }

    async fn classify_remote(&self, question: &str) -> Option<Intent> {
        let client = self.llm.as_ref()?;

        let request = LlmRequest::new(question, self.model.clone())
            .with_system(CLASSIFIER_SYSTEM)
            .with_temperature(0.0)
            .with_max_tokens(CLASSIFIER_MAX_TOKENS);

        match client.complete(&request).await {
            Ok(response) => {
                let parsed = parse_label(&response.content);
                if parsed.is_none() {
                    tracing::warn!(
                        "Unrecognized classifier label '{}', using pattern fallback",
                        response.content.trim()
                    );
                }
                parsed
            }
            Err(e) => {
                tracing::warn!("Intent classifier unavailable, using pattern fallback: {}", e);
                None
            }
        }
    }
}

/// Pattern-based classification over the lowercased question.
pub fn classify_local(question: &str) -> Intent {
    let lowered = question.trim().to_lowercase();
    if lowered.is_empty() {
        return Intent::Fact;
    }

    let speculative = SPECULATIVE_RE.is_match(&lowered);
    let factual = FACTUAL_RE.is_match(&lowered);

    match (speculative, factual) {
        (true, true) => Intent::Mixed,
        (true, false) => Intent::Futuristic,
        _ => Intent::Fact,
    }
}

/// Whether the question refers back to the conversation itself.
pub fn is_conversation_reference(question: &str) -> bool {
    let lowered = question.trim().to_lowercase();
    !lowered.is_empty() && CONVERSATION_RE.is_match(&lowered)
}

/// Map a classifier reply onto an intent.
pub fn parse_label(text: &str) -> Option<Intent> {
    let label = text.trim().to_uppercase();
    if label.contains("FACTUAL") {
        Some(Intent::Fact)
    } else if label.contains("FUTURISTIC") {
        Some(Intent::Futuristic)
    } else if label.contains("MIXED") {
        Some(Intent::Mixed)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fakes::FakeLlm;

    #[test]
    fn test_blank_is_fact_and_not_reference() {
        assert_eq!(classify_local(""), Intent::Fact);
        assert_eq!(classify_local("   "), Intent::Fact);
        assert!(!is_conversation_reference(""));
    }

    #[test]
    fn test_mixed_when_both_pattern_sets_match() {
        let question = "What is the current price and will the price increase next year?";
        assert_eq!(classify_local(question), Intent::Mixed);
    }

    #[test]
    fn test_futuristic_without_factual_markers() {
        assert_eq!(classify_local("Forecast revenue for 2030"), Intent::Futuristic);
        assert_eq!(classify_local("Sales might double by 2027"), Intent::Futuristic);
    }

    #[test]
    fn test_historical_question_is_fact() {
        assert_eq!(classify_local("How much was spent last year?"), Intent::Fact);
        assert_eq!(classify_local("Summarize the annual report"), Intent::Fact);
    }

    #[test]
    fn test_patterns_respect_word_boundaries() {
        // "willow" and "maybe" contain speculative words only as substrings
        assert_eq!(classify_local("Describe the willow chair, maybe"), Intent::Fact);
    }

    #[test]
    fn test_conversation_reference_is_independent_of_intent() {
        let question = "What did I ask earlier in this chat?";
        assert!(is_conversation_reference(question));
        assert_eq!(classify_local(question), Intent::Fact);

        assert!(is_conversation_reference("Will my FIRST QUESTION matter next year?"));
        assert!(!is_conversation_reference("What is the warranty period?"));
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label(" factual\n"), Some(Intent::Fact));
        assert_eq!(parse_label("FUTURISTIC."), Some(Intent::Futuristic));
        assert_eq!(parse_label("Mixed"), Some(Intent::Mixed));
        assert_eq!(parse_label("FACT"), None);
        assert_eq!(parse_label(""), None);
    }

    #[tokio::test]
    async fn test_llm_label_wins() {
        let llm = Arc::new(FakeLlm::replying("FUTURISTIC"));
        let classifier = IntentClassifier::with_llm(llm.clone(), "test-model");

        let intent = classifier.classify("What is the warranty period?").await;
        assert_eq!(intent, Intent::Futuristic);

        let request = llm.last_request().unwrap();
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.max_tokens, Some(CLASSIFIER_MAX_TOKENS));
        assert_eq!(request.system.as_deref(), Some(CLASSIFIER_SYSTEM));
    }

    #[tokio::test]
    async fn test_llm_failure_falls_back_to_patterns() {
        let classifier =
            IntentClassifier::with_llm(Arc::new(FakeLlm::failing("timeout")), "test-model");
        assert_eq!(
            classifier.classify("Will sales double next year?").await,
            Intent::Futuristic
        );
    }

    #[tokio::test]
    async fn test_unparseable_label_falls_back_to_patterns() {
        let classifier =
            IntentClassifier::with_llm(Arc::new(FakeLlm::replying("banana")), "test-model");
        assert_eq!(
            classifier.classify("What is the current price?").await,
            Intent::Fact
        );
    }

    #[tokio::test]
    async fn test_blank_question_skips_llm() {
        let llm = Arc::new(FakeLlm::replying("MIXED"));
        let classifier = IntentClassifier::with_llm(llm.clone(), "test-model");

        assert_eq!(classifier.classify("  ").await, Intent::Fact);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_local_classifier_is_deterministic() {
        let classifier = IntentClassifier::local();
        let question = "Which products are upcoming?";
        let first = classifier.classify(question).await;
        assert_eq!(first, classifier.classify(question).await);
        assert_eq!(first, Intent::Mixed);
    }
}
