//! Half-open text ranges.

use std::fmt;
use std::ops::Range;

use crate::error::{LabelError, Result};

/// A half-open span `[start, start + length)` of UTF-8 byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TextRange {
    /// First byte covered by the range.
    pub start: usize,
    /// Number of bytes covered.
    pub length: usize,
}

impl TextRange {
    /// Create a range from a start offset and a length.
    pub const fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Create a range from start and end offsets. `end` is clamped to `start`.
    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self {
            start,
            length: end.saturating_sub(start),
        }
    }

    /// The range covering all of `text`.
    pub fn full(text: &str) -> Self {
        Self::new(0, text.len())
    }

    /// One past the last covered byte.
    #[inline]
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.length)
    }

    /// Whether the range covers no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Whether `offset` lies inside the range.
    #[inline]
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end()
    }

    /// Whether the two ranges share at least one byte.
    ///
    /// An empty range shares no bytes, so it only overlaps an identical
    /// empty range.
    pub fn overlaps(&self, other: &TextRange) -> bool {
        if self.is_empty() || other.is_empty() {
            return self == other;
        }
        self.start < other.end() && other.start < self.end()
    }

    /// Whether `other` lies entirely inside this range.
    pub fn contains_range(&self, other: &TextRange) -> bool {
        other.start >= self.start && other.end() <= self.end()
    }

    /// The overlapping part of two ranges, if any bytes are shared.
    pub fn intersection(&self, other: &TextRange) -> Option<TextRange> {
        let start = self.start.max(other.start);
        let end = self.end().min(other.end());
        (start < end).then(|| TextRange::from_bounds(start, end))
    }

    /// Check that the range fits `text` and both ends sit on char boundaries.
    pub fn validate(&self, text: &str) -> Result<()> {
        let end = self
            .start
            .checked_add(self.length)
            .filter(|&end| end <= text.len())
            .ok_or_else(|| LabelError::out_of_bounds(self.start, self.length, text.len()))?;

        for offset in [self.start, end] {
            if !text.is_char_boundary(offset) {
                return Err(LabelError::NotCharBoundary { offset });
            }
        }
        Ok(())
    }

    /// The substring of `text` covered by this range, if valid.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end())
    }

    /// Convert to a standard range.
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

impl From<Range<usize>> for TextRange {
    fn from(range: Range<usize>) -> Self {
        Self::from_bounds(range.start, range.end)
    }
}

impl From<TextRange> for Range<usize> {
    fn from(range: TextRange) -> Self {
        range.as_range()
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}
