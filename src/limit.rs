//! Output size limiting

use crate::record::FrequencyEntry;
use std::cmp::Ordering;

/// Result of applying a limit
#[derive(Debug)]
pub struct Limited<T> {
    /// Kept entries in output order
    pub kept: Vec<T>,
    /// Number of entries dropped
    pub discarded: usize,
}

/// Keeps the highest-frequency entries up to an optional maximum
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeLimiter {
    max: Option<usize>,
}

impl SizeLimiter {
    pub fn new(max: Option<usize>) -> Self {
        Self { max }
    }

    /// Rank entries and cut the tail
    ///
    /// Entries are ordered by normalized frequency (highest first), ties by
    /// first-seen order. Without a maximum nothing is dropped.
    pub fn apply<T: FrequencyEntry>(&self, mut entries: Vec<T>) -> Limited<T> {
        entries.sort_by(rank);

        let discarded = match self.max {
            Some(max) if entries.len() > max => {
                let discarded = entries.len() - max;
                entries.truncate(max);
                discarded
            }
            _ => 0,
        };

        Limited {
            kept: entries,
            discarded,
        }
    }
}

/// Output ordering shared by words and bigrams
pub fn rank<T: FrequencyEntry>(a: &T, b: &T) -> Ordering {
    b.normalized_frequency()
        .cmp(&a.normalized_frequency())
        .then_with(|| a.order().cmp(&b.order()))
}
