//! # AOSP Wordlist
//!
//! Generates the AOSP keyboard's combined wordlist (`lang_wordlist.combined`)
//! from a language word-frequency dump.
//!
//! ## Pipeline
//!
//! 1. **Source reader**: parse `tsv`, `spaced`, `csv`, `ranked` or raw `corpus` input
//! 2. **Exclusion filter**: drop profanity and offensive words (case-insensitive)
//! 3. **Spelling check**: optionally keep only words a hunspell dictionary knows
//! 4. **Normalizer**: rescale frequencies to 1-255 (linear or log)
//! 5. **Size limiter**: keep the N most frequent words
//! 6. **Writer**: emit the header and ` word=...,f=...` lines
//!
//! ## Usage
//!
//! ```bash
//! aosp-wordlist -l en_US -i en_full.txt -o en_wordlist.combined -m "English (US)" \
//!     --profanity profanity.txt --offensive offensive.txt -n 100000
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use aosp_wordlist::filter::ExclusionFilter;
//! use aosp_wordlist::limit::SizeLimiter;
//! use aosp_wordlist::normalize::{Normalizer, Scale};
//! use aosp_wordlist::output::{CombinedWriter, Header};
//! use aosp_wordlist::source::{DumpFormat, SourceReader};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut source = SourceReader::new(DumpFormat::Tsv, Some("#")).read(Path::new("en.tsv"))?;
//! let filter = ExclusionFilter::from_paths(Some(Path::new("profanity.txt")), None)?;
//! filter.apply(&mut source.words, &mut source.bigrams);
//! source.words.retain(|r| !r.excluded);
//!
//! let mut words = source.words.into_records();
//! Normalizer::new(Scale::Log, 1).normalize(&mut words);
//! let words = SizeLimiter::new(Some(50_000)).apply(words).kept;
//!
//! let mut writer = CombinedWriter::create(Path::new("en.combined"), 64 * 1024)?;
//! writer.write_all(&Header::new("en_US", "English (US)", 0), &words, &[], || {})?;
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod encoding;
pub mod error;
pub mod filter;
pub mod limit;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod record;
pub mod source;
pub mod spelling;

pub use cli::Args;
pub use error::WordlistError;
pub use pipeline::{Pipeline, PipelineConfig};
