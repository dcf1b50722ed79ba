//! Word and bigram records
//!
//! Records live in insertion-ordered sets: a `Vec` holds them in first-seen
//! order and a hash index maps each key to its slot. Output order is always
//! derived from the `Vec`, never from hash iteration.

use ahash::RandomState;
use hashbrown::HashMap;

/// Anything that carries a raw and a normalized frequency
///
/// The normalizer and the size limiter work on this trait so words and
/// bigrams share one implementation.
pub trait FrequencyEntry {
    fn raw_frequency(&self) -> f64;

    fn normalized_frequency(&self) -> u8;

    fn set_normalized_frequency(&mut self, value: u8);

    /// First-seen position in the source, used to break ties
    fn order(&self) -> usize;
}

/// A dictionary headword
#[derive(Debug, Clone, PartialEq)]
pub struct WordRecord {
    pub word: String,
    pub raw_frequency: f64,
    pub normalized_frequency: u8,
    pub excluded: bool,
    pub order: usize,
}

impl WordRecord {
    pub fn new(word: impl Into<String>, raw_frequency: f64, order: usize) -> Self {
        Self {
            word: word.into(),
            raw_frequency,
            normalized_frequency: 0,
            excluded: false,
            order,
        }
    }
}

impl FrequencyEntry for WordRecord {
    fn raw_frequency(&self) -> f64 {
        self.raw_frequency
    }

    fn normalized_frequency(&self) -> u8 {
        self.normalized_frequency
    }

    fn set_normalized_frequency(&mut self, value: u8) {
        self.normalized_frequency = value;
    }

    fn order(&self) -> usize {
        self.order
    }
}

/// Two adjacent words, emitted under `first`
#[derive(Debug, Clone, PartialEq)]
pub struct BigramRecord {
    pub first: String,
    pub second: String,
    pub raw_frequency: f64,
    pub normalized_frequency: u8,
    pub order: usize,
}

impl FrequencyEntry for BigramRecord {
    fn raw_frequency(&self) -> f64 {
        self.raw_frequency
    }

    fn normalized_frequency(&self) -> u8 {
        self.normalized_frequency
    }

    fn set_normalized_frequency(&mut self, value: u8) {
        self.normalized_frequency = value;
    }

    fn order(&self) -> usize {
        self.order
    }
}

/// Insertion-ordered set of word records keyed by word
#[derive(Debug, Default)]
pub struct RecordSet {
    records: Vec<WordRecord>,
    index: HashMap<String, usize, RandomState>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            index: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    /// Record a frequency for `word`, keeping the highest value seen
    ///
    /// Returns true if the word was not present before.
    pub fn observe(&mut self, word: &str, frequency: f64) -> bool {
        match self.index.get(word) {
            Some(&slot) => {
                let record = &mut self.records[slot];
                if frequency > record.raw_frequency {
                    record.raw_frequency = frequency;
                }
                false
            }
            None => {
                self.push(word.to_string(), frequency);
                true
            }
        }
    }

    /// Add `count` occurrences of `word`
    pub fn count(&mut self, word: &str, count: f64) {
        match self.index.get(word) {
            Some(&slot) => self.records[slot].raw_frequency += count,
            None => self.push(word.to_string(), count),
        }
    }

    /// Merge a record in, keeping the highest frequency and earliest order
    pub fn merge(&mut self, record: WordRecord) {
        match self.index.get(&record.word) {
            Some(&slot) => {
                let existing = &mut self.records[slot];
                existing.raw_frequency = existing.raw_frequency.max(record.raw_frequency);
                existing.order = existing.order.min(record.order);
                existing.excluded |= record.excluded;
            }
            None => {
                self.index.insert(record.word.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    fn push(&mut self, word: String, frequency: f64) {
        let order = self.records.len();
        self.index.insert(word.clone(), order);
        self.records.push(WordRecord::new(word, frequency, order));
    }

    pub fn get(&self, word: &str) -> Option<&WordRecord> {
        self.index.get(word).map(|&slot| &self.records[slot])
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WordRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut WordRecord> {
        self.records.iter_mut()
    }

    /// Number of records not flagged as excluded
    pub fn surviving(&self) -> usize {
        self.records.iter().filter(|r| !r.excluded).count()
    }

    /// Keep only records matching the predicate, preserving order
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&WordRecord) -> bool,
    {
        self.records.retain(f);
        self.index.clear();
        for (slot, record) in self.records.iter().enumerate() {
            self.index.insert(record.word.clone(), slot);
        }
    }

    /// Replace raw frequencies with `len - order` so the first word ranks highest
    pub fn assign_rank_frequencies(&mut self) {
        let total = self.records.len();
        for record in &mut self.records {
            record.raw_frequency = total.saturating_sub(record.order) as f64;
        }
    }

    /// Consume the set, returning records in first-seen order
    pub fn into_records(self) -> Vec<WordRecord> {
        self.records
    }
}

/// Insertion-ordered set of bigrams keyed by word pair
#[derive(Debug, Default)]
pub struct BigramSet {
    records: Vec<BigramRecord>,
    index: HashMap<(String, String), usize, RandomState>,
}

impl BigramSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of the pair
    pub fn count(&mut self, first: &str, second: &str, count: f64) {
        let key = (first.to_string(), second.to_string());
        match self.index.get(&key) {
            Some(&slot) => self.records[slot].raw_frequency += count,
            None => {
                let order = self.records.len();
                self.index.insert(key, order);
                self.records.push(BigramRecord {
                    first: first.to_string(),
                    second: second.to_string(),
                    raw_frequency: count,
                    normalized_frequency: 0,
                    order,
                });
            }
        }
    }

    /// Merge a record in, summing frequencies of identical pairs
    pub fn merge(&mut self, record: BigramRecord) {
        let key = (record.first.clone(), record.second.clone());
        match self.index.get(&key) {
            Some(&slot) => {
                let existing = &mut self.records[slot];
                existing.raw_frequency += record.raw_frequency;
                existing.order = existing.order.min(record.order);
            }
            None => {
                self.index.insert(key, self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn get(&self, first: &str, second: &str) -> Option<&BigramRecord> {
        self.index
            .get(&(first.to_string(), second.to_string()))
            .map(|&slot| &self.records[slot])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BigramRecord> {
        self.records.iter()
    }

    /// Keep only pairs matching the predicate, preserving order
    ///
    /// Returns the number of pairs removed.
    pub fn retain<F>(&mut self, f: F) -> usize
    where
        F: FnMut(&BigramRecord) -> bool,
    {
        let before = self.records.len();
        self.records.retain(f);
        self.index.clear();
        for (slot, record) in self.records.iter().enumerate() {
            self.index
                .insert((record.first.clone(), record.second.clone()), slot);
        }
        before - self.records.len()
    }

    pub fn into_records(self) -> Vec<BigramRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_keeps_highest() {
        let mut set = RecordSet::new();

        assert!(set.observe("cat", 10.0));
        assert!(set.observe("dog", 50.0));
        assert!(!set.observe("cat", 30.0));
        assert!(!set.observe("cat", 20.0));

        let cat = set.get("cat").unwrap();
        assert_eq!(cat.raw_frequency, 30.0);
        assert_eq!(cat.order, 0);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_count_sums() {
        let mut set = RecordSet::new();
        set.count("the", 1.0);
        set.count("cat", 1.0);
        set.count("the", 1.0);

        assert_eq!(set.get("the").unwrap().raw_frequency, 2.0);
        assert_eq!(set.get("cat").unwrap().order, 1);
    }

    #[test]
    fn test_merge_keeps_earliest_order() {
        let mut set = RecordSet::new();
        set.merge(WordRecord::new("Paris", 5.0, 3));
        set.merge(WordRecord::new("Paris", 9.0, 1));

        let record = set.get("Paris").unwrap();
        assert_eq!(record.raw_frequency, 9.0);
        assert_eq!(record.order, 1);
    }

    #[test]
    fn test_retain_reindexes() {
        let mut set = RecordSet::new();
        set.observe("a", 1.0);
        set.observe("b", 2.0);
        set.observe("c", 3.0);

        set.retain(|r| r.word != "b");

        assert_eq!(set.len(), 2);
        assert!(!set.contains("b"));
        assert_eq!(set.get("c").unwrap().raw_frequency, 3.0);
        let words: Vec<_> = set.iter().map(|r| r.word.as_str()).collect();
        assert_eq!(words, vec!["a", "c"]);
    }

    #[test]
    fn test_rank_frequencies() {
        let mut set = RecordSet::new();
        set.observe("the", 0.0);
        set.observe("of", 0.0);
        set.observe("and", 0.0);
        set.assign_rank_frequencies();

        let raw: Vec<_> = set.iter().map(|r| r.raw_frequency).collect();
        assert_eq!(raw, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_surviving_count() {
        let mut set = RecordSet::new();
        set.observe("cat", 1.0);
        set.observe("damn", 1.0);
        for record in set.iter_mut() {
            record.excluded = record.word == "damn";
        }
        assert_eq!(set.surviving(), 1);
    }

    #[test]
    fn test_bigram_count_and_retain() {
        let mut bigrams = BigramSet::new();
        bigrams.count("the", "cat", 1.0);
        bigrams.count("the", "dog", 1.0);
        bigrams.count("the", "cat", 1.0);

        assert_eq!(bigrams.get("the", "cat").unwrap().raw_frequency, 2.0);

        let removed = bigrams.retain(|b| b.second != "dog");
        assert_eq!(removed, 1);
        assert!(bigrams.get("the", "dog").is_none());
        assert_eq!(bigrams.len(), 1);
    }
}
