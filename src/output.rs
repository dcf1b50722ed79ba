//! Combined wordlist output
//!
//! Writes the text format the AOSP dictionary compiler reads:
//!
//! ```text
//! dictionary=main:en_us,locale=en_US,description=English (US),date=1414726273,version=1
//!  word=the,f=255
//!   bigram=first,f=180
//!  word=of,f=248
//! ```

use crate::error::WordlistError;
use crate::record::{BigramRecord, WordRecord};

use hashbrown::HashMap;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Combined format version written in the header
pub const FORMAT_VERSION: u32 = 1;

/// First line of a combined wordlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Dictionary id, `main:<lang>`
    pub dictionary: String,
    pub locale: String,
    pub description: String,
    /// Unix timestamp in seconds
    pub date: u64,
    pub version: u32,
}

impl Header {
    pub fn new(lang: &str, description: &str, date: u64) -> Self {
        Self {
            dictionary: format!("main:{}", lang.to_lowercase()),
            locale: lang.to_string(),
            description: description.to_string(),
            date,
            version: FORMAT_VERSION,
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dictionary={},locale={},description={},date={},version={}",
            self.dictionary, self.locale, self.description, self.date, self.version
        )
    }
}

/// Format a word entry line
pub fn format_word_entry(word: &str, frequency: u8) -> String {
    format!(" word={},f={}", word, frequency)
}

/// Format a bigram entry line
pub fn format_bigram_entry(word: &str, frequency: u8) -> String {
    format!("  bigram={},f={}", word, frequency)
}

/// Totals for a finished file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub words_written: u64,
    pub bigrams_written: u64,
    pub bytes_written: u64,
}

/// Buffered combined wordlist writer
///
/// Every failure is reported as [`WordlistError::OutputWrite`]. Only
/// [`CombinedWriter::finish`] reports a failed final flush; dropping the
/// writer still flushes, but any error there is silently ignored.
pub struct CombinedWriter<W: Write> {
    writer: BufWriter<W>,
    path: PathBuf,
    summary: WriteSummary,
}

impl CombinedWriter<File> {
    /// Create or truncate the destination file
    pub fn create(path: &Path, buffer_size: usize) -> Result<Self, WordlistError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| WordlistError::output(path, e))?;

        Ok(Self::new(file, path, buffer_size))
    }
}

impl<W: Write> CombinedWriter<W> {
    /// Wrap any writer; `path` is only used in error messages
    pub fn new(inner: W, path: &Path, buffer_size: usize) -> Self {
        Self {
            writer: BufWriter::with_capacity(buffer_size, inner),
            path: path.to_path_buf(),
            summary: WriteSummary::default(),
        }
    }

    fn write_line(&mut self, line: &str) -> Result<(), WordlistError> {
        writeln!(self.writer, "{}", line).map_err(|e| WordlistError::output(&self.path, e))?;
        self.summary.bytes_written += line.len() as u64 + 1;
        Ok(())
    }

    pub fn write_header(&mut self, header: &Header) -> Result<(), WordlistError> {
        self.write_line(&header.to_string())
    }

    pub fn write_word(&mut self, record: &WordRecord) -> Result<(), WordlistError> {
        self.write_line(&format_word_entry(&record.word, record.normalized_frequency))?;
        self.summary.words_written += 1;
        Ok(())
    }

    pub fn write_bigram(&mut self, record: &BigramRecord) -> Result<(), WordlistError> {
        self.write_line(&format_bigram_entry(&record.second, record.normalized_frequency))?;
        self.summary.bigrams_written += 1;
        Ok(())
    }

    /// Write a whole wordlist: header, then each word followed by its bigrams
    ///
    /// `words` and `bigrams` are written in the order given. `on_word` runs
    /// after each word (progress reporting).
    pub fn write_all<F>(
        &mut self,
        header: &Header,
        words: &[WordRecord],
        bigrams: &[BigramRecord],
        mut on_word: F,
    ) -> Result<(), WordlistError>
    where
        F: FnMut(),
    {
        let mut by_first: HashMap<&str, Vec<&BigramRecord>> = HashMap::new();
        for bigram in bigrams {
            by_first.entry(bigram.first.as_str()).or_default().push(bigram);
        }

        self.write_header(header)?;
        for word in words {
            self.write_word(word)?;
            if let Some(following) = by_first.get(word.word.as_str()) {
                for bigram in following {
                    self.write_bigram(bigram)?;
                }
            }
            on_word();
        }
        Ok(())
    }

    /// Flush everything and return the totals
    pub fn finish(mut self) -> Result<WriteSummary, WordlistError> {
        self.writer
            .flush()
            .map_err(|e| WordlistError::output(&self.path, e))?;
        Ok(self.summary)
    }
}
