//! Sentiment verdict types
//!
//! A verdict is produced fresh for every message and never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed label vocabulary for classified messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
    Frustrated,
    Urgent,
}

impl SentimentLabel {
    /// All labels, in display order
    pub const ALL: [SentimentLabel; 5] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
        SentimentLabel::Frustrated,
        SentimentLabel::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Frustrated => "frustrated",
            SentimentLabel::Urgent => "urgent",
        }
    }

    /// Exact match against the vocabulary; anything else becomes `Neutral`
    pub fn coerce(raw: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == raw)
            .unwrap_or(SentimentLabel::Neutral)
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured sentiment verdict for one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentVerdict {
    /// 0 = very negative, 0.5 = neutral, 1 = very positive
    pub score: f64,
    pub label: SentimentLabel,
    /// Free-form primary emotion reported by the model
    pub emotion: String,
    pub confidence: f64,
}

impl SentimentVerdict {
    /// Build a verdict, clamping `score` and `confidence` into [0, 1]
    pub fn new(score: f64, label: SentimentLabel, emotion: impl Into<String>, confidence: f64) -> Self {
        Self {
            score: clamp_unit(score),
            label,
            emotion: emotion.into(),
            confidence: clamp_unit(confidence),
        }
    }

    /// Verdict used whenever classification cannot complete
    pub fn fallback() -> Self {
        Self {
            score: 0.5,
            label: SentimentLabel::Neutral,
            emotion: "unknown".to_string(),
            confidence: 0.3,
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// How a verdict was obtained
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationStatus {
    Ok,
    /// The fallback verdict was substituted; the reason is kept for logging
    Degraded(String),
}

/// Verdict plus the way it was obtained
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentOutcome {
    pub verdict: SentimentVerdict,
    pub status: ClassificationStatus,
}

impl SentimentOutcome {
    pub fn ok(verdict: SentimentVerdict) -> Self {
        Self {
            verdict,
            status: ClassificationStatus::Ok,
        }
    }

    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            verdict: SentimentVerdict::fallback(),
            status: ClassificationStatus::Degraded(reason.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.status, ClassificationStatus::Degraded(_))
    }
}
