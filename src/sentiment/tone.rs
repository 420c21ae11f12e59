//! Tone directives and priority derived from a verdict

use crate::types::{SentimentLabel, SentimentVerdict};

const FRUSTRATED_TONE: &str = "The customer is frustrated or annoyed. Be extra empathetic, \
apologize for any inconvenience, acknowledge their frustration, \
and focus on solving their issue quickly and efficiently.";

const URGENT_TONE: &str = "The customer needs urgent help or is time-sensitive. \
Be concise, prioritize immediate solutions, skip unnecessary details, \
and provide clear next steps quickly.";

const NEGATIVE_TONE: &str = "The customer is unhappy or disappointed. Show understanding, \
apologize sincerely, and work to turn their experience around. \
Be solution-focused and reassuring.";

const POSITIVE_TONE: &str = "The customer has a positive tone. Match their energy, \
be friendly and enthusiastic! Use a warm, conversational style.";

const NEUTRAL_TONE: &str = "Maintain a professional, helpful, and friendly tone. \
Be clear and informative.";

/// Natural-language style directive for the generator
pub fn tone_instruction(verdict: &SentimentVerdict) -> &'static str {
    match verdict.label {
        SentimentLabel::Frustrated => FRUSTRATED_TONE,
        SentimentLabel::Urgent => URGENT_TONE,
        SentimentLabel::Negative => NEGATIVE_TONE,
        SentimentLabel::Positive => POSITIVE_TONE,
        SentimentLabel::Neutral => NEUTRAL_TONE,
    }
}

/// Frustrated and urgent messages jump the queue
pub fn is_high_priority(verdict: &SentimentVerdict) -> bool {
    matches!(verdict.label, SentimentLabel::Frustrated | SentimentLabel::Urgent)
}
