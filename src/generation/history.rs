//! Bounded conversation history
//!
//! Sliding window of conversation turns:
//! - Maximum 10 turns retained
//! - Oldest evicted first
//! - Appended only in user/assistant pairs by the orchestrator

use std::collections::VecDeque;

use crate::types::ConversationTurn;

/// Maximum number of retained turns
pub const MAX_HISTORY_TURNS: usize = 10;

/// Conversation history with bounded storage
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<ConversationTurn>,
    max_turns: usize,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationHistory {
    /// Create history with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_TURNS)
    }

    /// Create history with a custom capacity
    pub fn with_capacity(max_turns: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(max_turns),
            max_turns,
        }
    }

    /// Append a turn, evicting the oldest when over capacity
    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    /// Append a completed user/assistant exchange
    pub fn record_exchange(&mut self, query: impl Into<String>, reply: impl Into<String>) {
        self.push(ConversationTurn::user(query));
        self.push(ConversationTurn::assistant(reply));
    }

    /// All retained turns, oldest first
    pub fn as_slice(&mut self) -> &[ConversationTurn] {
        self.turns.make_contiguous()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    /// Last `n` turns, oldest first
    pub fn last_n(&self, n: usize) -> Vec<&ConversationTurn> {
        let start = self.turns.len().saturating_sub(n);
        self.turns.range(start..).collect()
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.back()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_turns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn test_new_history_is_empty() {
        let history = ConversationHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.capacity(), MAX_HISTORY_TURNS);
    }

    #[test]
    fn test_exchange_appends_pair() {
        let mut history = ConversationHistory::new();
        history.record_exchange("Where is my order?", "It ships tomorrow.");

        assert_eq!(history.len(), 2);
        let turns = history.as_slice();
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "It ships tomorrow.");
    }

    #[test]
    fn test_eviction_keeps_most_recent() {
        let mut history = ConversationHistory::new();
        for i in 0..8 {
            history.record_exchange(format!("q{}", i), format!("a{}", i));
        }

        assert_eq!(history.len(), MAX_HISTORY_TURNS);
        let first = history.iter().next().unwrap();
        assert_eq!(first.content, "q3");
        assert_eq!(history.last().unwrap().content, "a7");
    }

    #[test]
    fn test_last_n() {
        let mut history = ConversationHistory::new();
        history.record_exchange("q0", "a0");
        history.record_exchange("q1", "a1");

        let last = history.last_n(3);
        let contents: Vec<&str> = last.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["a0", "q1", "a1"]);
        assert_eq!(history.last_n(10).len(), 4);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut history = ConversationHistory::new();
        history.record_exchange("q", "a");
        history.clear();
        history.clear();
        assert!(history.is_empty());
    }
}
