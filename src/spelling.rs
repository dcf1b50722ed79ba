//! Spelling dictionary check
//!
//! Keeps only words a spelling dictionary knows. Lowercase input words that
//! the dictionary only lists capitalized (`paris` vs `Paris`) are emitted in
//! the dictionary's form.
//!
//! # Dictionary files
//!
//! - **Hunspell `.dic`**: the leading entry-count line is skipped and
//!   `/FLAGS` suffixes plus morphological fields are stripped.
//! - **Plain lists**: one word per line; `#` lines are comments.

use crate::encoding::read_lines;
use crate::error::WordlistError;
use crate::record::{BigramRecord, BigramSet, RecordSet, WordRecord};

use ahash::RandomState;
use hashbrown::HashSet;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Hunspell dictionary file name for a language tag
///
/// Tags without a region are doubled (`de` becomes `de_DE`).
pub fn hunspell_code(lang: &str) -> String {
    if lang.contains('_') {
        lang.to_string()
    } else {
        format!("{}_{}", lang.to_lowercase(), lang.to_uppercase())
    }
}

/// Path of the `.dic` file for `lang` inside a hunspell directory
pub fn hunspell_path(dir: &Path, lang: &str) -> PathBuf {
    dir.join(format!("{}.dic", hunspell_code(lang)))
}

/// Counts from one spelling pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpellingReport {
    /// Words not found in any form
    pub rejected: usize,
    /// Words replaced by their capitalized form
    pub capitalized: usize,
    /// Bigrams dropped because one side was rejected
    pub bigrams: usize,
}

/// A set of correctly spelled words
#[derive(Debug, Clone, Default)]
pub struct SpellingDictionary {
    words: HashSet<String, RandomState>,
}

impl SpellingDictionary {
    /// Load dictionary from a file path
    pub fn from_file(path: &Path) -> Result<Self, WordlistError> {
        let lines = read_lines(path, None)
            .map_err(|e| WordlistError::unreadable(path, e))?
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| WordlistError::unreadable(path, e))?;

        let dictionary = Self::from_lines(lines);
        if dictionary.is_empty() {
            return Err(WordlistError::fatal(path, "spelling dictionary has no entries"));
        }
        log::info!("Loaded {} dictionary entries from {:?}", dictionary.len(), path);
        Ok(dictionary)
    }

    /// Load dictionary from lines of a `.dic` file or plain list
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words = HashSet::with_hasher(RandomState::new());

        for (index, line) in lines.into_iter().enumerate() {
            let line = line.as_ref().trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            // hunspell entry count
            if index == 0 && line.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }

            let entry = line.split(['\t', ' ']).next().unwrap_or_default();
            let word = strip_flags(entry);
            if !word.is_empty() {
                words.insert(word.to_string());
            }
        }

        Self { words }
    }

    /// Check if a word exists exactly as given
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Dictionary form of `word`, if it has one
    pub fn resolve<'a>(&self, word: &'a str) -> Option<Cow<'a, str>> {
        if self.contains(word) {
            return Some(Cow::Borrowed(word));
        }
        let capitalized = capitalize(word);
        if capitalized != word && self.contains(&capitalized) {
            return Some(Cow::Owned(capitalized));
        }
        None
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Drop unknown words and rewrite words into dictionary form
    ///
    /// Words that collapse onto the same form are merged. Only surviving
    /// (non-excluded) words are checked; excluded ones are dropped.
    pub fn apply(&self, words: RecordSet, bigrams: BigramSet) -> (RecordSet, BigramSet, SpellingReport) {
        let mut report = SpellingReport::default();
        let mut checked = RecordSet::with_capacity(words.len());

        for record in words.into_records().into_iter().filter(|r| !r.excluded) {
            let replacement = match self.resolve(&record.word) {
                Some(Cow::Borrowed(_)) => None,
                Some(Cow::Owned(form)) => Some(form),
                None => {
                    log::trace!("Not in dictionary: {}", record.word);
                    report.rejected += 1;
                    continue;
                }
            };

            match replacement {
                Some(form) => {
                    report.capitalized += 1;
                    checked.merge(WordRecord { word: form, ..record });
                }
                None => checked.merge(record),
            }
        }

        let mut kept_bigrams = BigramSet::new();
        for bigram in bigrams.into_records() {
            match (self.resolve(&bigram.first), self.resolve(&bigram.second)) {
                (Some(first), Some(second)) => kept_bigrams.merge(BigramRecord {
                    first: first.into_owned(),
                    second: second.into_owned(),
                    ..bigram
                }),
                _ => report.bigrams += 1,
            }
        }

        log::info!(
            "Spelling check rejected {} words, capitalized {}",
            report.rejected,
            report.capitalized
        );
        (checked, kept_bigrams, report)
    }
}

/// Strip a hunspell `/FLAGS` suffix, honoring `\/` escapes
fn strip_flags(entry: &str) -> Cow<'_, str> {
    let mut escaped = false;
    for (i, c) in entry.char_indices() {
        match c {
            '\\' => escaped = !escaped,
            '/' if !escaped => return unescape(&entry[..i]),
            _ => escaped = false,
        }
    }
    unescape(entry)
}

fn unescape(word: &str) -> Cow<'_, str> {
    if word.contains("\\/") {
        Cow::Owned(word.replace("\\/", "/"))
    } else {
        Cow::Borrowed(word)
    }
}

/// First character uppercased, the rest lowercased
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary() -> SpellingDictionary {
        SpellingDictionary::from_lines(["4", "cat/S", "dog/SM\tpo:noun", "Paris", "the"])
    }

    #[test]
    fn test_parse_hunspell_dic() {
        let dict = dictionary();

        assert_eq!(dict.len(), 4);
        assert!(dict.contains("cat"));
        assert!(dict.contains("dog"));
        assert!(!dict.contains("4"));
        assert!(!dict.contains("cat/S"));
    }

    #[test]
    fn test_plain_list_with_comments() {
        let dict = SpellingDictionary::from_lines(["# words", "apple", "", "pear"]);
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_escaped_slash() {
        let dict = SpellingDictionary::from_lines(["km\\/h/X"]);
        assert!(dict.contains("km/h"));
    }

    #[test]
    fn test_resolve_capitalized() {
        let dict = dictionary();

        assert_eq!(dict.resolve("cat").as_deref(), Some("cat"));
        assert_eq!(dict.resolve("paris").as_deref(), Some("Paris"));
        assert_eq!(dict.resolve("PARIS").as_deref(), Some("Paris"));
        assert_eq!(dict.resolve("zzz"), None);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("élan"), "Élan");
        assert_eq!(capitalize("mIXED"), "Mixed");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_apply() {
        let dict = dictionary();
        let mut words = RecordSet::new();
        words.observe("the", 10.0);
        words.observe("paris", 4.0);
        words.observe("Paris", 6.0);
        words.observe("qwzx", 8.0);
        words.observe("cat", 2.0);
        for record in words.iter_mut() {
            record.excluded = record.word == "cat";
        }
        let mut bigrams = BigramSet::new();
        bigrams.count("the", "paris", 1.0);
        bigrams.count("the", "qwzx", 1.0);

        let (checked, bigrams, report) = dict.apply(words, bigrams);

        assert_eq!(checked.len(), 2);
        let paris = checked.get("Paris").unwrap();
        assert_eq!(paris.raw_frequency, 6.0);
        assert_eq!(paris.order, 1);
        assert!(!checked.contains("cat"));
        assert_eq!(report.rejected, 1);
        assert_eq!(report.capitalized, 1);
        assert_eq!(report.bigrams, 1);
        assert!(bigrams.get("the", "Paris").is_some());
    }

    #[test]
    fn test_hunspell_code() {
        assert_eq!(hunspell_code("de"), "de_DE");
        assert_eq!(hunspell_code("pt_BR"), "pt_BR");
        assert_eq!(
            hunspell_path(Path::new("/usr/share/hunspell"), "nl"),
            PathBuf::from("/usr/share/hunspell/nl_NL.dic")
        );
    }
}
