//! Positions and ranges inside an asset.

use std::fmt;

use crate::error::{ChunkError, Result};

/// A byte offset into an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Byte offset from the start of the asset.
    pub offset: u64,
}

impl Position {
    /// Creates a position at `offset`.
    pub const fn new(offset: u64) -> Self {
        Self { offset }
    }
}

/// A byte offset extended with 0-based line and column information.
///
/// Columns count bytes since the last `\n`, so a tab counts as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextPosition {
    /// Byte offset from the start of the asset.
    pub offset: u64,
    /// 0-based line, if known.
    pub line: Option<u64>,
    /// 0-based column, if known.
    pub column: Option<u64>,
}

impl TextPosition {
    /// Creates a position with an offset only.
    pub const fn new(offset: u64) -> Self {
        Self {
            offset,
            line: None,
            column: None,
        }
    }

    /// Creates a position with offset, line and column.
    pub const fn at(offset: u64, line: u64, column: u64) -> Self {
        Self {
            offset,
            line: Some(line),
            column: Some(column),
        }
    }
}

/// A `[start, end)` span of an asset.
///
/// Both endpoints are always of the same kind: binary assets use plain
/// [`Position`]s, text assets use [`TextPosition`]s. A zero-length range is
/// valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Range {
    /// A span of a binary asset.
    Bytes {
        /// Inclusive start.
        start: Position,
        /// Exclusive end.
        end: Position,
    },
    /// A span of a text asset.
    Text {
        /// Inclusive start.
        start: TextPosition,
        /// Exclusive end.
        end: TextPosition,
    },
}

impl Range {
    /// Creates a binary range.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidRange`] if `end < start`.
    pub fn bytes(start: u64, end: u64) -> Result<Self> {
        check(start, end)?;
        Ok(Range::Bytes {
            start: Position::new(start),
            end: Position::new(end),
        })
    }

    /// Creates a text range.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidRange`] if `end.offset < start.offset`.
    pub fn text(start: TextPosition, end: TextPosition) -> Result<Self> {
        check(start.offset, end.offset)?;
        Ok(Range::Text { start, end })
    }

    /// Returns the start offset.
    pub fn start(&self) -> u64 {
        match self {
            Range::Bytes { start, .. } => start.offset,
            Range::Text { start, .. } => start.offset,
        }
    }

    /// Returns the end offset (exclusive).
    pub fn end(&self) -> u64 {
        match self {
            Range::Bytes { end, .. } => end.offset,
            Range::Text { end, .. } => end.offset,
        }
    }

    /// Returns the number of bytes covered.
    ///
    /// A reversed range built from the public variants counts as empty.
    pub fn len(&self) -> u64 {
        self.end().saturating_sub(self.start())
    }

    /// Returns true for a zero-length range.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if this range belongs to a text asset.
    pub fn is_text(&self) -> bool {
        matches!(self, Range::Text { .. })
    }

    /// Returns the range as plain offsets.
    pub fn offsets(&self) -> std::ops::Range<u64> {
        self.start()..self.end()
    }
}

fn check(start: u64, end: u64) -> Result<()> {
    if end < start {
        return Err(ChunkError::InvalidRange { start, end });
    }
    Ok(())
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Range::Bytes { start, end } => write!(f, "{}..{}", start.offset, end.offset),
            Range::Text { start, end } => {
                write!(f, "{}..{}", start.offset, end.offset)?;
                if let (Some(l0), Some(l1)) = (start.line, end.line) {
                    write!(f, " (lines {}..{})", l0, l1)?;
                }
                Ok(())
            }
        }
    }
}
