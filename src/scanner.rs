//! @ai:module:intent Walk document lines and collect marks, in full or bounded directional scans
//! @ai:module:layer application
//! @ai:module:public_api Document, TextDocument, ScanMode, scan, split_lines
//! @ai:module:depends_on classifier, mark, error
//! @ai:module:stateless true

use crate::classifier::ClassifierSet;
use crate::error::{Error, Result};
use crate::mark::{Location, Mark};
use std::path::{Path, PathBuf};

/// @ai:intent Read-only view of a document's lines
pub trait Document {
    /// @ai:intent Identity of the document (its path)
    fn identity(&self) -> &Path;

    fn line_count(&self) -> usize;

    /// @ai:intent Text of line `n` without its line terminator
    fn line_text(&self, n: usize) -> Option<&str>;
}

/// @ai:intent A document held in memory as split lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    path: PathBuf,
    lines: Vec<String>,
}

impl TextDocument {
    /// @ai:intent Build a document from text using the crate-wide line rule
    pub fn new(path: impl Into<PathBuf>, text: &str) -> Self {
        Self {
            path: path.into(),
            lines: split_lines(text),
        }
    }

    /// @ai:intent Decode raw bytes as UTF-8 and build a document
    /// @ai:edge_cases invalid UTF-8 -> Error::Decode
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Result<Self> {
        let path = path.into();
        match String::from_utf8(bytes) {
            Ok(text) => Ok(Self::new(path, &text)),
            Err(_) => Err(Error::Decode { path }),
        }
    }

    /// @ai:intent Read and decode a file from disk
    /// @ai:effects fs:read
    pub async fn open(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_bytes(path, bytes)
    }
}

impl Document for TextDocument {
    fn identity(&self) -> &Path {
        &self.path
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_text(&self, n: usize) -> Option<&str> {
        self.lines.get(n).map(String::as_str)
    }
}

/// @ai:intent Split text into lines on `\n`, dropping one trailing `\r` per line
/// @ai:example ("a\r\nb") -> ["a", "b"]
/// @ai:example ("a\n") -> ["a", ""]
/// @ai:effects pure
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// @ai:intent How much of the document a scan covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Every line, in ascending order.
    Full,
    /// Walk from `start` (inclusive); `limit > 0` goes forward, `limit < 0` backward.
    /// Stops after `|limit|` marks or at the document boundary.
    Bounded { start: usize, limit: isize },
}

impl ScanMode {
    pub fn forward(start: usize, limit: usize) -> Self {
        ScanMode::Bounded {
            start,
            limit: limit as isize,
        }
    }

    pub fn backward(start: usize, limit: usize) -> Self {
        ScanMode::Bounded {
            start,
            limit: -(limit as isize),
        }
    }
}

/// @ai:intent Scan a document and return its marks in walk order
/// @ai:post at most one mark per line
/// @ai:post Full and forward scans are in ascending line order; backward scans descending
/// @ai:edge_cases empty classifier set -> empty result
/// @ai:effects pure
pub fn scan<D: Document + ?Sized>(doc: &D, classifiers: &ClassifierSet, mode: ScanMode) -> Vec<Mark> {
    if classifiers.is_empty() {
        return Vec::new();
    }

    let count = doc.line_count();
    match mode {
        ScanMode::Full => collect(doc, classifiers, 0..count, usize::MAX),
        ScanMode::Bounded { limit: 0, .. } => Vec::new(),
        ScanMode::Bounded { start, limit } if limit > 0 => {
            collect(doc, classifiers, start..count, limit.unsigned_abs())
        }
        ScanMode::Bounded { start, limit } => {
            if count == 0 {
                return Vec::new();
            }
            let from = start.min(count - 1);
            collect(doc, classifiers, (0..=from).rev(), limit.unsigned_abs())
        }
    }
}

fn collect<D, I>(doc: &D, classifiers: &ClassifierSet, lines: I, max: usize) -> Vec<Mark>
where
    D: Document + ?Sized,
    I: Iterator<Item = usize>,
{
    let mut marks = Vec::new();
    for line_number in lines {
        if marks.len() >= max {
            break;
        }
        let Some(text) = doc.line_text(line_number) else {
            continue;
        };
        if let Some((kind, fields)) = classifiers.classify(text) {
            let location = Location::whole_line(doc.identity(), line_number, text);
            marks.push(Mark::new(kind, location, fields));
        }
    }
    marks
}
