//! Prompt assembly
//!
//! Pure: the same query, context, verdict and history always produce the same
//! prompt. Section order is fixed: preamble, tone, history, context, question,
//! instructions.

use crate::sentiment::tone_instruction;
use crate::types::{ConversationTurn, SentimentVerdict};

/// Number of trailing history turns rendered into a prompt
pub const PROMPT_HISTORY_WINDOW: usize = 3;

const PREAMBLE: &str = "You are a helpful customer support agent for an e-commerce company.";

const TASK: &str = "Answer the customer's question using the provided context from the knowledge base.";

const INSTRUCTIONS: &str = "\
1. Use ONLY information from the knowledge base context above
2. If the context doesn't contain the answer, politely say you don't have that information
3. Be concise but thorough
4. Use a friendly, professional tone
5. Adapt your response style based on the customer's sentiment";

/// Builds the generation prompt
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    history_window: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            history_window: PROMPT_HISTORY_WINDOW,
        }
    }

    /// Assemble the full prompt.
    ///
    /// `history` may hold any number of turns; only the last three are
    /// rendered, and the section is omitted when it is empty.
    pub fn build_prompt(
        &self,
        query: &str,
        context: &str,
        verdict: &SentimentVerdict,
        history: &[ConversationTurn],
    ) -> String {
        let mut prompt = String::new();

        prompt.push_str(PREAMBLE);
        prompt.push_str("\n\n## Your Task:\n");
        prompt.push_str(TASK);
        prompt.push('\n');
        prompt.push_str(tone_instruction(verdict));
        prompt.push('\n');

        if !history.is_empty() {
            prompt.push_str("\n## Previous Conversation:\n");
            let start = history.len().saturating_sub(self.history_window);
            for turn in &history[start..] {
                prompt.push_str(&turn.render());
                prompt.push('\n');
            }
        }

        prompt.push_str("\n## Knowledge Base Context:\n");
        prompt.push_str(context);
        prompt.push_str("\n\n## Customer's Current Question:\n");
        prompt.push_str(query);
        prompt.push_str("\n\n## Instructions:\n");
        prompt.push_str(INSTRUCTIONS);
        prompt.push_str("\n\n## Your Response:\n");

        prompt
    }
}

/// Convenience wrapper around [`PromptBuilder::build_prompt`]
pub fn build_prompt(
    query: &str,
    context: &str,
    verdict: &SentimentVerdict,
    history: &[ConversationTurn],
) -> String {
    PromptBuilder::new().build_prompt(query, context, verdict, history)
}
