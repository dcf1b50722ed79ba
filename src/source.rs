//! Source reader
//!
//! Parses a language dump into word records. Each supported dump layout is a
//! [`DumpFormat`] variant implementing the same "line in, entry or error out"
//! contract; the reader owns blank/comment skipping, duplicate merging and
//! the malformed-line policy.

use crate::encoding::read_lines;
use crate::error::{LineError, WordlistError};
use crate::normalize::Scale;
use crate::record::{BigramSet, RecordSet};

use clap::ValueEnum;
use encoding_rs::Encoding;
use regex::Regex;
use std::io;
use std::path::Path;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// Malformed lines logged at warn level before switching to debug
const MAX_LOGGED_WARNINGS: u64 = 10;

/// Supported dump layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DumpFormat {
    /// `word<TAB>count`, further columns ignored
    Tsv,
    /// `word count`, split at the last run of whitespace
    Spaced,
    /// `word,count`, split at the last comma
    Csv,
    /// One word per line, most frequent first
    Ranked,
    /// Running text; words and adjacent word pairs are counted
    Corpus,
}

/// Outcome of parsing one non-blank, non-comment line
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine<'a> {
    /// A word with its frequency from the dump
    Entry { word: &'a str, frequency: f64 },
    /// A word whose frequency follows from its position
    Ranked(&'a str),
    /// Normalized tokens of a line of running text
    Tokens(Vec<String>),
}

impl DumpFormat {
    /// Rescale function that fits what the format's numbers mean
    ///
    /// Occurrence counts span orders of magnitude and get a log scale;
    /// rank positions are already evenly spread and stay linear.
    pub fn default_scale(self) -> Scale {
        match self {
            Self::Ranked => Scale::Linear,
            Self::Tsv | Self::Spaced | Self::Csv | Self::Corpus => Scale::Log,
        }
    }

    /// Parse a single line
    pub fn parse_line(self, line: &str) -> Result<ParsedLine<'_>, LineError> {
        match self {
            Self::Tsv => {
                let mut fields = line.split('\t');
                let word = fields.next().unwrap_or_default();
                let frequency = fields.next().ok_or(LineError::MissingFrequency)?;
                entry(word, frequency)
            }
            Self::Spaced => {
                let (word, frequency) = line
                    .trim()
                    .rsplit_once(char::is_whitespace)
                    .ok_or(LineError::MissingFrequency)?;
                entry(word, frequency)
            }
            Self::Csv => {
                let (word, frequency) = line
                    .rsplit_once(',')
                    .ok_or(LineError::MissingFrequency)?;
                entry(word, frequency)
            }
            Self::Ranked => Ok(ParsedLine::Ranked(check_word(line)?)),
            Self::Corpus => Ok(ParsedLine::Tokens(tokenize(line))),
        }
    }
}

fn entry<'a>(word: &'a str, frequency: &str) -> Result<ParsedLine<'a>, LineError> {
    let word = check_word(word)?;
    let frequency = parse_frequency(frequency)?;
    Ok(ParsedLine::Entry { word, frequency })
}

/// Trim a headword and reject characters the combined format reserves
fn check_word(word: &str) -> Result<&str, LineError> {
    let word = word.trim();
    if word.is_empty() {
        return Err(LineError::EmptyWord);
    }
    if let Some(found) = word.chars().find(|&c| c == ',' || c == '=' || c.is_control()) {
        return Err(LineError::ReservedCharacter {
            word: word.to_string(),
            found,
        });
    }
    Ok(word)
}

fn parse_frequency(value: &str) -> Result<f64, LineError> {
    let value = value.trim();
    let frequency: f64 = value
        .parse()
        .map_err(|_| LineError::InvalidFrequency(value.to_string()))?;

    if !frequency.is_finite() {
        return Err(LineError::InvalidFrequency(value.to_string()));
    }
    if frequency < 0.0 {
        return Err(LineError::NegativeFrequency(frequency));
    }
    Ok(frequency)
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w+|[^\w\s]+").unwrap())
}

/// Split running text into word and punctuation tokens, NFC and lowercased
pub fn tokenize(line: &str) -> Vec<String> {
    token_pattern()
        .find_iter(line)
        .map(|m| m.as_str().nfc().collect::<String>().to_lowercase())
        .collect()
}

fn is_word_token(token: &str) -> bool {
    token.chars().all(char::is_alphabetic)
}

/// Counters for one read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadReport {
    /// Lines seen, including skipped ones
    pub lines: u64,
    /// Blank and comment lines
    pub skipped: u64,
    /// Lines that failed to parse
    pub malformed: u64,
    /// Name of the encoding the input was decoded from
    pub encoding: &'static str,
}

/// Everything read from a dump
#[derive(Debug)]
pub struct SourceData {
    pub words: RecordSet,
    pub bigrams: BigramSet,
    pub report: ReadReport,
}

/// Reads a dump in one format
#[derive(Debug, Clone)]
pub struct SourceReader {
    format: DumpFormat,
    comment_marker: Option<String>,
    encoding: Option<&'static Encoding>,
}

impl SourceReader {
    /// Create a reader; an empty comment marker disables comment skipping
    pub fn new(format: DumpFormat, comment_marker: Option<&str>) -> Self {
        Self {
            format,
            comment_marker: comment_marker
                .filter(|m| !m.is_empty())
                .map(str::to_string),
            encoding: None,
        }
    }

    /// Decode input with a fixed encoding instead of detecting it
    pub fn with_encoding(mut self, encoding: Option<&'static Encoding>) -> Self {
        self.encoding = encoding;
        self
    }

    /// Read and parse a dump file
    pub fn read(&self, path: &Path) -> Result<SourceData, WordlistError> {
        let lines = read_lines(path, self.encoding).map_err(|e| WordlistError::unreadable(path, e))?;
        let encoding = lines.encoding().name();

        let mut data = self.read_lines(path, lines)?;
        data.report.encoding = encoding;
        Ok(data)
    }

    /// Parse already decoded lines; `path` is only used in messages
    pub fn read_lines<I>(&self, path: &Path, lines: I) -> Result<SourceData, WordlistError>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        let mut words = RecordSet::new();
        let mut bigrams = BigramSet::new();
        let mut report = ReadReport {
            encoding: "UTF-8",
            ..ReadReport::default()
        };

        for (index, line) in lines.into_iter().enumerate() {
            let line = line.map_err(|e| WordlistError::unreadable(path, e))?;
            report.lines += 1;

            if self.is_skippable(&line) {
                report.skipped += 1;
                continue;
            }

            match self.format.parse_line(&line) {
                Ok(ParsedLine::Entry { word, frequency }) => {
                    let word: String = word.nfc().collect();
                    words.observe(&word, frequency);
                }
                Ok(ParsedLine::Ranked(word)) => {
                    let word: String = word.nfc().collect();
                    words.observe(&word, 0.0);
                }
                Ok(ParsedLine::Tokens(tokens)) => {
                    for token in tokens.iter().filter(|t| is_word_token(t)) {
                        words.count(token, 1.0);
                    }
                    for pair in tokens.windows(2) {
                        if is_word_token(&pair[0]) && is_word_token(&pair[1]) {
                            bigrams.count(&pair[0], &pair[1], 1.0);
                        }
                    }
                }
                Err(source) => {
                    report.malformed += 1;
                    let err = WordlistError::MalformedInput {
                        path: path.to_path_buf(),
                        line: index + 1,
                        source,
                    };
                    if report.malformed <= MAX_LOGGED_WARNINGS {
                        log::warn!("Skipping {}: {}", err, err_reason(&err));
                    } else {
                        log::debug!("Skipping {}: {}", err, err_reason(&err));
                    }
                }
            }
        }

        if self.format == DumpFormat::Ranked {
            words.assign_rank_frequencies();
        }

        if words.is_empty() {
            return Err(WordlistError::fatal(
                path,
                format!(
                    "no valid {:?} records ({} lines, {} malformed)",
                    self.format, report.lines, report.malformed
                ),
            ));
        }

        log::info!(
            "Read {} distinct words from {} lines ({} malformed)",
            words.len(),
            report.lines,
            report.malformed
        );

        Ok(SourceData {
            words,
            bigrams,
            report,
        })
    }

    fn is_skippable(&self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return true;
        }
        match self.comment_marker {
            Some(ref marker) => trimmed.starts_with(marker.as_str()),
            None => false,
        }
    }
}

fn err_reason(err: &WordlistError) -> String {
    std::error::Error::source(err)
        .map(|e| e.to_string())
        .unwrap_or_default()
}
