//! Sentiment classifier backed by a text generator
//!
//! One generation call per message, no retries at this layer. Every failure
//! degrades to the fixed fallback verdict; `analyze` never fails outward.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::providers::TextGenerator;
use crate::sentiment::parser::parse_verdict;
use crate::types::{GenerationConfig, SentimentOutcome, SentimentVerdict};

/// Sentiment classifier
#[derive(Clone)]
pub struct SentimentClassifier {
    generator: Arc<dyn TextGenerator>,
    model: String,
    config: GenerationConfig,
}

impl SentimentClassifier {
    /// Create classifier using `model` on `generator`
    pub fn new(generator: Arc<dyn TextGenerator>, model: impl Into<String>) -> Self {
        Self::with_config(generator, model, GenerationConfig::default())
    }

    /// Create with custom sampling parameters
    pub fn with_config(
        generator: Arc<dyn TextGenerator>,
        model: impl Into<String>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            generator,
            model: model.into(),
            config,
        }
    }

    /// Classify `message`, reporting whether the fallback was substituted
    pub async fn classify(&self, message: &str) -> SentimentOutcome {
        let prompt = build_classification_prompt(message);

        let raw = match self.generator.generate(&self.model, &prompt, &self.config).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(model = %self.model, error = %e, "Sentiment classification failed; using fallback");
                return SentimentOutcome::degraded(format!("provider error: {}", e));
            }
        };

        match parse_verdict(&raw) {
            Ok(verdict) => {
                debug!(label = %verdict.label, score = verdict.score, "Sentiment classified");
                SentimentOutcome::ok(verdict)
            }
            Err(failure) => {
                warn!(error = %failure, response = %raw, "Unparsable sentiment response; using fallback");
                SentimentOutcome::degraded(failure.to_string())
            }
        }
    }

    /// Classify `message`; always yields a verdict
    pub async fn analyze(&self, message: &str) -> SentimentVerdict {
        self.classify(message).await.verdict
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Fixed-schema instruction asking for exactly four keys and a closed label set
pub fn build_classification_prompt(message: &str) -> String {
    format!(
        r#"You are a sentiment analysis expert. Analyze the sentiment and emotion in this customer service message.

Customer Message: "{message}"

Analyze and return ONLY a JSON object (no markdown, no explanations) with this EXACT structure:
{{
  "score": <float between 0.0 and 1.0, where 0=very negative, 0.5=neutral, 1=very positive>,
  "label": "<one of: positive, neutral, negative, frustrated, urgent>",
  "emotion": "<primary emotion: happy, satisfied, neutral, confused, disappointed, angry, frustrated, anxious, urgent>",
  "confidence": <float between 0.0 and 1.0 indicating classification confidence>
}}

Rules:
- "frustrated" = customer is annoyed or impatient, showing irritation
- "urgent" = customer needs immediate help or expresses time pressure
- "negative" = unhappy but not yet frustrated
- "neutral" = factual inquiry without strong emotion
- "positive" = satisfied or happy tone

JSON output:"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ProviderError, ProviderResult};
    use crate::types::SentimentLabel;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CannedGenerator {
        reply: std::result::Result<String, String>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl CannedGenerator {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        fn name(&self) -> &str {
            "canned"
        }

        async fn generate(&self, model: &str, prompt: &str, _config: &GenerationConfig) -> ProviderResult<String> {
            self.prompts
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));
            self.reply.clone().map_err(ProviderError::Other)
        }
    }

    #[tokio::test]
    async fn test_analyze_parses_reply() {
        let generator = CannedGenerator::replying(
            r#"{"score": 0.1, "label": "urgent", "emotion": "anxious", "confidence": 0.95}"#,
        );
        let classifier = SentimentClassifier::new(generator.clone(), "gemini-1.5-flash");

        let outcome = classifier.classify("URGENT: my payment failed!").await;
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.verdict.label, SentimentLabel::Urgent);

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, "gemini-1.5-flash");
        assert!(prompts[0].1.contains("URGENT: my payment failed!"));
    }

    #[tokio::test]
    async fn test_provider_error_degrades() {
        let classifier = SentimentClassifier::new(CannedGenerator::failing("503"), "m");
        let outcome = classifier.classify("hello").await;
        assert!(outcome.is_degraded());
        assert_eq!(outcome.verdict, SentimentVerdict::fallback());
    }

    #[tokio::test]
    async fn test_malformed_reply_degrades() {
        let classifier = SentimentClassifier::new(CannedGenerator::replying("I think they are happy"), "m");
        assert_eq!(classifier.analyze("thanks!").await, SentimentVerdict::fallback());
    }

    #[tokio::test]
    async fn test_no_retry_on_failure() {
        let generator = CannedGenerator::failing("429 Resource exhausted");
        let classifier = SentimentClassifier::new(generator.clone(), "m");
        classifier.analyze("hello").await;
        assert_eq!(generator.prompts.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_prompt_lists_vocabulary() {
        let prompt = build_classification_prompt("where is my parcel?");
        for label in SentimentLabel::ALL {
            assert!(prompt.contains(label.as_str()));
        }
        assert!(prompt.contains("\"confidence\""));
        assert!(prompt.contains("where is my parcel?"));
    }
}
