//! Line/offset conversion.

use serde::{Deserialize, Serialize};

use crate::CharRange;

/// A zero-based line number as it appears in annotation metadata.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct LinePos {
    pub line: usize,
}

/// Character offsets of every line start in a text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineIndex {
    /// Offset of the first character of each line. Always starts with 0.
    starts: Vec<usize>,
    /// Total length in characters.
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        let mut len = 0;
        for (offset, ch) in text.chars().enumerate() {
            if ch == '\n' {
                starts.push(offset + 1);
            }
            len = offset + 1;
        }
        LineIndex { starts, len }
    }

    /// Number of lines (a trailing newline opens an empty last line).
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Length of the indexed text in characters.
    pub fn char_len(&self) -> usize {
        self.len
    }

    /// Range of `line`, including its terminating newline if there is one.
    pub fn line_range(&self, line: LinePos) -> Option<CharRange> {
        let start = *self.starts.get(line.line)?;
        let end = self
            .starts
            .get(line.line + 1)
            .copied()
            .unwrap_or(self.len);
        Some(CharRange::new(start, end))
    }

    /// Zero-based (line, column) of a character offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        };
        (line, offset - self.starts[line])
    }
}
