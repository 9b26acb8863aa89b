//! Position and span tracking for source locations
//!
//! Tokens and AST nodes carry a [`Span`] recording both the byte range in
//! the source string and the 1-based line/column positions of its ends.
//! [`LineIndex`] converts byte offsets to positions with an O(log n)
//! binary search over precomputed line starts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range as ByteRange;

/// A 1-based line:column position in source text.
///
/// Columns count characters, not bytes, so multi-byte UTF-8 input reports
/// the positions an editor would show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// A source span: byte range plus start/end positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub bytes: ByteRange<usize>,
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(bytes: ByteRange<usize>, start: Position, end: Position) -> Self {
        Self { bytes, start, end }
    }

    /// Bounding span over `self` and `other`.
    pub fn merge(&self, other: &Span) -> Span {
        let (start, start_byte) = if self.start <= other.start {
            (self.start, self.bytes.start)
        } else {
            (other.start, other.bytes.start)
        };
        let (end, end_byte) = if self.end >= other.end {
            (self.end, self.bytes.end)
        } else {
            (other.end, other.bytes.end)
        };
        Span::new(start_byte..end_byte, start, end)
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Precomputed line-start table for byte-offset to position conversion.
pub struct LineIndex {
    /// Byte offset of the first character of each line.
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            line_starts,
            len: source.len(),
        }
    }

    /// Convert a byte offset into a 1-based position.
    ///
    /// Offsets past the end of the source clamp to the final position.
    pub fn position(&self, source: &str, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line_start = self.line_starts[line];
        let column = source[line_start..offset].chars().count() + 1;
        Position::new(line + 1, column)
    }

    /// Convert a byte range into a full span.
    pub fn span(&self, source: &str, bytes: ByteRange<usize>) -> Span {
        let start = self.position(source, bytes.start);
        let end = self.position(source, bytes.end);
        Span::new(bytes, start, end)
    }
}
