//! Bounded key history and consistency scoring.

use std::collections::VecDeque;

use crate::error::ParamsError;
use crate::key::BrainKey;

/// Default number of keys kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Default number of most recent keys compared by [`KeyHistory::consistency`].
pub const DEFAULT_CONSISTENCY_WINDOW: usize = 5;

/// The most recent derived keys, oldest first.
#[derive(Debug, Clone)]
pub struct KeyHistory {
    keys: VecDeque<BrainKey>,
    capacity: usize,
    window: usize,
}

impl KeyHistory {
    /// Create an empty history.
    pub fn new(capacity: usize, window: usize) -> Result<Self, ParamsError> {
        if capacity == 0 || window == 0 {
            return Err(ParamsError::EmptyHistory);
        }
        Ok(Self {
            keys: VecDeque::with_capacity(capacity),
            capacity,
            window,
        })
    }

    /// Record a key, evicting the oldest when full.
    pub fn push(&mut self, key: BrainKey) {
        if self.keys.len() == self.capacity {
            self.keys.pop_front();
        }
        self.keys.push_back(key);
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if no key has been recorded.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Maximum number of keys held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recent key.
    pub fn last(&self) -> Option<&BrainKey> {
        self.keys.back()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &BrainKey> {
        self.keys.iter()
    }

    /// Percentage of identical pairs among the last `window` keys.
    ///
    /// Returns 0 with fewer than two keys.
    pub fn consistency(&self) -> f64 {
        if self.keys.len() < 2 {
            return 0.0;
        }
        let start = self.keys.len().saturating_sub(self.window);
        let recent: Vec<&BrainKey> = self.keys.range(start..).collect();

        let mut matches = 0usize;
        let mut pairs = 0usize;
        for (i, a) in recent.iter().enumerate() {
            for b in &recent[i + 1..] {
                pairs += 1;
                if a == b {
                    matches += 1;
                }
            }
        }

        if pairs == 0 {
            0.0
        } else {
            matches as f64 / pairs as f64 * 100.0
        }
    }

    /// Drop all keys.
    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

impl Default for KeyHistory {
    fn default() -> Self {
        Self {
            keys: VecDeque::with_capacity(DEFAULT_HISTORY_CAPACITY),
            capacity: DEFAULT_HISTORY_CAPACITY,
            window: DEFAULT_CONSISTENCY_WINDOW,
        }
    }
}
