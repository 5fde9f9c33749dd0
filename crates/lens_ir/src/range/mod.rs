//! Character ranges.
//!
//! A [`CharRange`] is a half-open interval `[char_start, char_end)` of
//! character offsets into a document. It is the unit every annotation layer
//! and every trace step uses to point at source text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error when constructing a range whose end precedes its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeError {
    pub start: usize,
    pub end: usize,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "range end {} precedes start {}", self.end, self.start)
    }
}

impl std::error::Error for RangeError {}

/// Character range in a document.
///
/// Serialized as `{"char_start": N, "char_end": M}`. Extra fields the backend
/// may attach (byte offsets, file names) are ignored on decode.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
pub struct CharRange {
    pub char_start: usize,
    pub char_end: usize,
}

impl CharRange {
    /// Create a new range. Callers are responsible for `start <= end`.
    #[inline]
    pub const fn new(char_start: usize, char_end: usize) -> Self {
        CharRange {
            char_start,
            char_end,
        }
    }

    /// Create a range, rejecting an end that precedes the start.
    pub fn try_new(char_start: usize, char_end: usize) -> Result<Self, RangeError> {
        if char_end < char_start {
            return Err(RangeError {
                start: char_start,
                end: char_end,
            });
        }
        Ok(CharRange::new(char_start, char_end))
    }

    /// Create a point range (zero-length).
    #[inline]
    pub const fn point(offset: usize) -> Self {
        CharRange::new(offset, offset)
    }

    /// Length in characters.
    #[inline]
    pub const fn len(&self) -> usize {
        self.char_end.saturating_sub(self.char_start)
    }

    /// Check if the range is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.char_end <= self.char_start
    }

    /// Check if an offset is within this range.
    #[inline]
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.char_start && offset < self.char_end
    }

    /// Check if another range is fully contained within this range.
    #[inline]
    pub fn contains_range(&self, other: CharRange) -> bool {
        self.char_start <= other.char_start && other.char_end <= self.char_end
    }

    /// Check if two ranges share at least one character.
    ///
    /// A point range overlaps a range that strictly contains its offset.
    #[inline]
    pub fn overlaps(&self, other: CharRange) -> bool {
        if self.is_empty() {
            return other.char_start < self.char_start && self.char_start < other.char_end;
        }
        if other.is_empty() {
            return self.char_start < other.char_start && other.char_start < self.char_end;
        }
        self.char_start < other.char_end && other.char_start < self.char_end
    }

    /// Check if the range lies within a document of `len` characters.
    #[inline]
    pub fn fits_within(&self, len: usize) -> bool {
        self.char_start <= self.char_end && self.char_end <= len
    }

    /// Merge two ranges to create one covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: CharRange) -> CharRange {
        CharRange::new(
            self.char_start.min(other.char_start),
            self.char_end.max(other.char_end),
        )
    }

    /// Shift both ends by a signed delta, saturating at zero.
    #[inline]
    #[must_use]
    pub fn shifted(self, delta: isize) -> CharRange {
        CharRange::new(
            self.char_start.saturating_add_signed(delta),
            self.char_end.saturating_add_signed(delta),
        )
    }

    /// Convert to a `std::ops::Range`.
    #[inline]
    pub fn to_range(&self) -> std::ops::Range<usize> {
        self.char_start..self.char_end
    }
}

impl From<std::ops::Range<usize>> for CharRange {
    fn from(range: std::ops::Range<usize>) -> Self {
        CharRange::new(range.start, range.end)
    }
}

impl fmt::Debug for CharRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.char_start, self.char_end)
    }
}

impl fmt::Display for CharRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.char_start, self.char_end)
    }
}
