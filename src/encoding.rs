//! Encoding detection and transcoding module
//!
//! Frequency dumps and word lists come in whatever encoding the corpus
//! tooling produced. Everything is decoded to UTF-8 before parsing.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use encoding_rs_io::{DecodeReaderBytes, DecodeReaderBytesBuilder};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Size of the sample fed to the detector
pub(crate) const SAMPLE_SIZE: usize = 64 * 1024;

/// Result of encoding detection
#[derive(Debug, Clone)]
pub struct EncodingInfo {
    /// Detected encoding name
    pub name: &'static str,
    /// Confidence level (0.0 - 1.0)
    pub confidence: f32,
    /// The encoding_rs Encoding reference
    pub encoding: &'static Encoding,
}

impl Default for EncodingInfo {
    fn default() -> Self {
        Self {
            name: "UTF-8",
            confidence: 1.0,
            encoding: encoding_rs::UTF_8,
        }
    }
}

/// Detect the encoding of a file by sampling its content
pub fn detect_encoding(path: &Path) -> io::Result<EncodingInfo> {
    let file = File::open(path)?;
    let mut sample = Vec::with_capacity(SAMPLE_SIZE);
    file.take(SAMPLE_SIZE as u64).read_to_end(&mut sample)?;

    if sample.is_empty() {
        return Ok(EncodingInfo::default());
    }

    if let Some(encoding) = detect_bom(&sample) {
        return Ok(EncodingInfo {
            name: encoding.name(),
            confidence: 1.0,
            encoding,
        });
    }

    // A full sample may end mid-character; only a short one is the whole file
    let truncated = sample.len() == SAMPLE_SIZE;
    if is_utf8_prefix(&sample, truncated) {
        return Ok(EncodingInfo::default());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(&sample, !truncated);
    let encoding = detector.guess(None, true);

    Ok(EncodingInfo {
        name: encoding.name(),
        confidence: 0.8,
        encoding,
    })
}

/// Whether `sample` is UTF-8, allowing an incomplete trailing sequence
/// when the sample was cut from a longer file
///
/// Pure ASCII counts as UTF-8: it decodes identically and keeps any
/// multi-byte text past the sample intact.
fn is_utf8_prefix(sample: &[u8], truncated: bool) -> bool {
    match std::str::from_utf8(sample) {
        Ok(_) => true,
        Err(e) => truncated && e.error_len().is_none(),
    }
}

/// Detect BOM (Byte Order Mark) at the start of content
fn detect_bom(content: &[u8]) -> Option<&'static Encoding> {
    Encoding::for_bom(content).map(|(encoding, _)| encoding)
}

/// Resolve a WHATWG encoding label such as `latin1` or `utf-16le`
pub fn encoding_for_label(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}

/// Line iterator that decodes any supported encoding to UTF-8
///
/// A BOM always wins over the detected or requested encoding and is stripped.
/// Undecodable bytes become U+FFFD instead of failing the read.
pub struct EncodedLineIterator {
    reader: BufReader<DecodeReaderBytes<File, Vec<u8>>>,
    encoding: &'static Encoding,
    line_buffer: String,
}

impl EncodedLineIterator {
    /// Create a new line iterator for a file with automatic encoding detection
    pub fn new(path: &Path) -> io::Result<Self> {
        let info = detect_encoding(path)?;
        if info.confidence < 1.0 {
            log::debug!("Guessed encoding {} for {:?} (confidence {:.1})", info.name, path, info.confidence);
        }
        Self::with_encoding(path, info.encoding)
    }

    /// Create with a specific encoding
    pub fn with_encoding(path: &Path, encoding: &'static Encoding) -> io::Result<Self> {
        let file = File::open(path)?;
        let decoder = DecodeReaderBytesBuilder::new()
            .encoding(Some(encoding))
            .bom_override(true)
            .build(file);

        Ok(Self {
            reader: BufReader::with_capacity(SAMPLE_SIZE, decoder),
            encoding,
            line_buffer: String::with_capacity(256),
        })
    }

    /// Encoding the file is decoded from
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }
}

impl Iterator for EncodedLineIterator {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.line_buffer.clear();

        match self.reader.read_line(&mut self.line_buffer) {
            Ok(0) => None,
            Ok(_) => {
                let line = self.line_buffer.trim_end_matches(['\n', '\r']);
                Some(Ok(line.to_string()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Open a file and yield its lines decoded to UTF-8
///
/// `encoding` forces a specific encoding; `None` detects it.
pub fn read_lines(path: &Path, encoding: Option<&'static Encoding>) -> io::Result<EncodedLineIterator> {
    match encoding {
        Some(encoding) => EncodedLineIterator::with_encoding(path, encoding),
        None => EncodedLineIterator::new(path),
    }
}
