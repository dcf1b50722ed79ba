//! Command-line interface definition for aosp-wordlist
//!
//! Provides argument parsing and validation for the wordlist generator.

use crate::normalize::{Scale, DEFAULT_BIGRAM_FLOOR, DEFAULT_FLOOR};
use crate::source::DumpFormat;

use clap::Parser;
use std::path::PathBuf;

/// Default cap on bigrams, independent of the word limit
pub const DEFAULT_BIGRAM_LIMIT: usize = 50_000;

/// AOSP keyboard wordlist generator
///
/// Converts a language frequency dump into a combined wordlist for the
/// AOSP dictionary compiler.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "aosp-wordlist",
    author = "m0h1nd4",
    version,
    about = "Generate AOSP keyboard combined wordlists from language frequency dumps",
    long_about = r#"
╔══════════════════════════════════════════════════════════════════════════════╗
║                            AOSP-WORDLIST v1.0.0                              ║
║               Frequency dumps -> AOSP keyboard combined wordlists            ║
╚══════════════════════════════════════════════════════════════════════════════╝

Reads a word-frequency dump, drops profanity and offensive words, rescales
frequencies to 1-255 and writes the combined wordlist the AOSP dictionary
compiler turns into a .dict file.

EXAMPLES:
    # "word count" dump, keep the top 100k words
    aosp-wordlist -l de -i de_full.txt -o de_wordlist.combined -m "Deutsch" -n 100000

    # Tab-separated dump with exclusion lists
    aosp-wordlist -l en_US -i en.tsv -f tsv -o en.combined -m "English (US)" \
        --profanity profanity.txt --offensive offensive.txt

    # Raw text corpus, spell-checked against the system hunspell dictionary
    aosp-wordlist -l nl -i corpus.txt -f corpus -o nl.combined -m "Nederlands" \
        --hunspell-dir /usr/share/hunspell

INPUT FORMATS:
    tsv      word<TAB>count
    spaced   word count           (default)
    csv      word,count
    ranked   one word per line, most frequent first
    corpus   running text, words and word pairs are counted
"#
)]
pub struct Args {
    /// Language tag, e.g. en_US or de
    #[arg(short, long, required = true, value_name = "LANG")]
    pub lang: String,

    /// Path to the language dump file
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path of the combined wordlist to write
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Human-readable dictionary description for the header
    #[arg(short = 'm', long, required = true, value_name = "TEXT")]
    pub description: String,

    /// Words to exclude as profanity, one per line
    #[arg(long, value_name = "PATH")]
    pub profanity: Option<PathBuf>,

    /// Words to exclude as offensive, one per line
    #[arg(long, value_name = "PATH")]
    pub offensive: Option<PathBuf>,

    /// Maximum number of words to write
    #[arg(short = 'n', long, value_name = "NUM")]
    pub limit: Option<usize>,

    /// Maximum number of bigrams to write (never above --limit)
    #[arg(long, value_name = "NUM", default_value_t = DEFAULT_BIGRAM_LIMIT)]
    pub bigram_limit: usize,

    /// Layout of the input dump
    #[arg(short, long, value_enum, default_value_t = DumpFormat::Spaced)]
    pub format: DumpFormat,

    /// Frequency rescale function (default depends on --format)
    #[arg(long, value_enum)]
    pub scale: Option<Scale>,

    /// Lowest normalized frequency assigned to a word (1-255)
    #[arg(long, value_name = "NUM", default_value_t = DEFAULT_FLOOR)]
    pub floor: u8,

    /// Lowest normalized frequency assigned to a bigram (1-255)
    #[arg(long, value_name = "NUM", default_value_t = DEFAULT_BIGRAM_FLOOR)]
    pub bigram_floor: u8,

    /// Lines starting with this marker are ignored (empty disables)
    #[arg(long, value_name = "MARKER", default_value = "#")]
    pub comment_marker: String,

    /// Input encoding label, e.g. latin1 (default: auto-detect)
    #[arg(long, value_name = "LABEL")]
    pub encoding: Option<String>,

    /// Spelling dictionary (hunspell .dic or plain list); unknown words are dropped
    #[arg(long, value_name = "PATH", conflicts_with = "hunspell_dir")]
    pub dictionary: Option<PathBuf>,

    /// Hunspell directory holding <lang>_<LANG>.dic
    #[arg(long, value_name = "DIR")]
    pub hunspell_dir: Option<PathBuf>,

    /// Header date as unix seconds (default: SOURCE_DATE_EPOCH, then input mtime)
    #[arg(long, value_name = "SECS")]
    pub date: Option<u64>,

    /// Buffer size for writing (default: 8MB)
    #[arg(long, value_name = "SIZE", default_value = "8MB")]
    pub buffer_size: String,

    /// Quiet mode - minimal output
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Verbose mode - detailed logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Dry run - run every stage but do not write the output file
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

impl Args {
    /// Parse buffer size string to bytes
    pub fn parse_buffer_size(&self) -> anyhow::Result<usize> {
        parse_size(&self.buffer_size)
    }

    /// Comment marker, `None` when disabled
    pub fn get_comment_marker(&self) -> Option<&str> {
        Some(self.comment_marker.as_str()).filter(|m| !m.is_empty())
    }

    /// Rescale function: explicit choice or the format's default
    pub fn get_scale(&self) -> Scale {
        self.scale.unwrap_or_else(|| self.format.default_scale())
    }

    /// Bigram cap, bounded by the word limit
    pub fn get_bigram_limit(&self) -> usize {
        match self.limit {
            Some(limit) => self.bigram_limit.min(limit),
            None => self.bigram_limit,
        }
    }
}

/// Parse human-readable size string to bytes
fn parse_size(size_str: &str) -> anyhow::Result<usize> {
    let size_str = size_str.trim().to_uppercase();

    let (num_str, multiplier) = if let Some(num) = size_str.strip_suffix("GB") {
        (num, 1024 * 1024 * 1024)
    } else if let Some(num) = size_str.strip_suffix("MB") {
        (num, 1024 * 1024)
    } else if let Some(num) = size_str.strip_suffix("KB") {
        (num, 1024)
    } else if let Some(num) = size_str.strip_suffix('B') {
        (num, 1)
    } else {
        (size_str.as_str(), 1)
    };

    let num: usize = num_str
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid size format: '{}'", size_str))?;

    Ok(num * multiplier)
}
