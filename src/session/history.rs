//! Bounded refinement history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of refinements kept.
pub const HISTORY_CAPACITY: usize = 10;

/// One completed refinement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPair {
    pub input: String,
    pub output: String,
    /// When the refinement finished. Older records may not have it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refined_at: Option<DateTime<Utc>>,
}

impl TextPair {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            refined_at: None,
        }
    }

    pub fn at(mut self, refined_at: DateTime<Utc>) -> Self {
        self.refined_at = Some(refined_at);
        self
    }
}

/// Insertion-ordered history with FIFO eviction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<TextPair>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Restore from stored entries, keeping only the most recent ones.
    pub fn from_entries(entries: Vec<TextPair>) -> Self {
        let mut history = Self::default();
        for entry in entries {
            history.push(entry);
        }
        history
    }

    /// Append `entry`, evicting the oldest entry when full.
    pub fn push(&mut self, entry: TextPair) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TextPair> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&TextPair> {
        self.entries.back()
    }

    /// Snapshot for persistence, oldest first.
    pub fn to_vec(&self) -> Vec<TextPair> {
        self.entries.iter().cloned().collect()
    }
}
