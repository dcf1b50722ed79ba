//! Error types for the wordlist pipeline
//!
//! Three outcomes matter to callers: input that cannot be used at all,
//! single lines that are skipped, and output that could not be written.

use std::io;
use std::path::PathBuf;

/// Exit code for unusable or empty input
pub const EXIT_FATAL_INPUT: i32 = 2;

/// Exit code for an unwritable destination
pub const EXIT_OUTPUT_WRITE: i32 = 3;

/// Pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum WordlistError {
    /// Input is missing, unreadable or yields nothing to emit
    #[error("unusable input {path:?}: {reason}")]
    FatalInput {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<io::Error>,
    },

    /// A single line could not be parsed; recovered by skipping it
    #[error("malformed line {line} in {path:?}")]
    MalformedInput {
        path: PathBuf,
        line: usize,
        #[source]
        source: LineError,
    },

    /// Destination could not be created, truncated or written
    #[error("failed to write output {path:?}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl WordlistError {
    pub fn fatal(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FatalInput {
            path: path.into(),
            reason: reason.into(),
            source: None,
        }
    }

    pub fn unreadable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FatalInput {
            path: path.into(),
            reason: "cannot be read".to_string(),
            source: Some(source),
        }
    }

    pub fn output(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::OutputWrite {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FatalInput { .. } => EXIT_FATAL_INPUT,
            Self::OutputWrite { .. } => EXIT_OUTPUT_WRITE,
            Self::MalformedInput { .. } => 1,
        }
    }
}

/// Why a dump line was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LineError {
    #[error("no frequency field")]
    MissingFrequency,

    #[error("invalid frequency '{0}'")]
    InvalidFrequency(String),

    #[error("negative frequency {0}")]
    NegativeFrequency(f64),

    #[error("empty word")]
    EmptyWord,

    #[error("word '{word}' contains reserved character {found:?}")]
    ReservedCharacter { word: String, found: char },
}
