use std::collections::VecDeque;

use crate::models::chat::Turn;

/// Most recent turns kept as context.
pub const HISTORY_LIMIT: usize = 10;

/// Sliding window over the conversation: appending past the limit drops the oldest turns.
///
/// Eviction is per turn, so a user question can outlive its answer (or the
/// reverse) after an odd number of evictions.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    turns: VecDeque<Turn>,
    limit: usize,
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }
}

impl HistoryWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self { turns: VecDeque::new(), limit }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.limit {
            self.turns.pop_front();
        }
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn to_vec(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
