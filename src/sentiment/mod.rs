//! Sentiment classification
//!
//! Components:
//! - Classifier: one model call per message, degrades to a fixed fallback
//! - Parser: defensive extraction of the JSON verdict
//! - Tone: label -> style directive and priority flag

pub mod classifier;
pub mod parser;
pub mod tone;

pub use classifier::SentimentClassifier;
pub use parser::{parse_verdict, ParseFailure};
pub use tone::{is_high_priority, tone_instruction};
