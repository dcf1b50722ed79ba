//! Exclusion filtering module
//!
//! Removes profanity and offensive words before normalization so banned
//! words cannot skew the frequency scale.

use crate::encoding::read_lines;
use crate::error::WordlistError;
use crate::record::{BigramSet, RecordSet};

use ahash::RandomState;
use hashbrown::HashSet;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// Case-fold a word for list matching
#[inline]
fn fold(word: &str) -> String {
    word.nfc().collect::<String>().to_lowercase()
}

/// Immutable set of banned words, matched case-insensitively
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    words: HashSet<String, RandomState>,
}

impl ExclusionList {
    /// A list that matches nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from lines; blank lines are ignored
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = lines
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .map(|l| fold(&l))
            .collect();
        Self { words }
    }

    /// Load one word per line
    pub fn from_file(path: &Path) -> Result<Self, WordlistError> {
        let lines = read_lines(path, None)
            .map_err(|e| WordlistError::unreadable(path, e))?
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| WordlistError::unreadable(path, e))?;

        let list = Self::from_lines(lines);
        log::debug!("Loaded {} exclusion entries from {:?}", list.len(), path);
        Ok(list)
    }

    /// Load a list if a path was given; absent means empty
    pub fn from_optional(path: Option<&Path>) -> Result<Self, WordlistError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::empty()),
        }
    }

    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        !self.words.is_empty() && self.words.contains(&fold(word))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Counts from one exclusion pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExclusionReport {
    /// Words matched by the profanity list
    pub profanity: usize,
    /// Words matched only by the offensive list
    pub offensive: usize,
    /// Bigrams dropped because one side was excluded
    pub bigrams: usize,
}

impl ExclusionReport {
    pub fn total(&self) -> usize {
        self.profanity + self.offensive
    }
}

/// Profanity and offensive lists applied as one union
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    profanity: ExclusionList,
    offensive: ExclusionList,
}

impl ExclusionFilter {
    pub fn new(profanity: ExclusionList, offensive: ExclusionList) -> Self {
        Self { profanity, offensive }
    }

    /// Load both lists; omitted paths become no-op lists
    pub fn from_paths(profanity: Option<&Path>, offensive: Option<&Path>) -> Result<Self, WordlistError> {
        Ok(Self::new(
            ExclusionList::from_optional(profanity)?,
            ExclusionList::from_optional(offensive)?,
        ))
    }

    /// Check if any filter would match anything
    pub fn is_noop(&self) -> bool {
        self.profanity.is_empty() && self.offensive.is_empty()
    }

    #[inline]
    pub fn is_excluded(&self, word: &str) -> bool {
        self.profanity.contains(word) || self.offensive.contains(word)
    }

    /// Flag matching words and drop bigrams that touch them
    pub fn apply(&self, words: &mut RecordSet, bigrams: &mut BigramSet) -> ExclusionReport {
        let mut report = ExclusionReport::default();
        if self.is_noop() {
            return report;
        }

        for record in words.iter_mut() {
            if self.profanity.contains(&record.word) {
                record.excluded = true;
                report.profanity += 1;
            } else if self.offensive.contains(&record.word) {
                record.excluded = true;
                report.offensive += 1;
            }
        }

        report.bigrams = bigrams.retain(|b| !self.is_excluded(&b.first) && !self.is_excluded(&b.second));

        log::info!(
            "Excluded {} words ({} profanity, {} offensive)",
            report.total(),
            report.profanity,
            report.offensive
        );
        report
    }
}
