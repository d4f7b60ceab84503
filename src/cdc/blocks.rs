//! Blank-run block splitting for text content.
//!
//! This module implements content-defined chunking for text: a stream is cut
//! wherever a run of two or more line endings (optionally separated by
//! spaces or tabs) occurs. Each such run becomes its own separator chunk, so
//! the text on either side and the whitespace between them are addressed
//! independently.
//!
//! # Algorithm Overview
//!
//! The stream is scanned once, byte by byte, through four states:
//!
//! - `Text`: accumulating non-blank content
//! - `Newline`: a line ending was just seen while in `Text`
//! - `EmptyLine`: spaces or tabs follow that line ending
//! - `EmptyBlock`: a second line ending closed a blank line
//!
//! When non-blank content arrives in `EmptyBlock`, two spans are emitted: the
//! text up to where the blank run's first line ending starts, and the blank
//! run itself up to just after its last `\n`. A `\r` directly before a `\n`
//! belongs to the line ending; a bare `\r` leaves the state untouched.
//!
//! The emitted spans are gapless and non-overlapping, and their union is
//! the whole stream. Boundaries depend only on the bytes, never on how the
//! stream is fed to [`BlockSplitter::push`].

use crate::chunk::TextPosition;

/// Running `(offset, line, column)` counters of a text scan.
///
/// Lines and columns are 0-based. Each byte advances the offset by one; a
/// `\n` advances the line and resets the column, any other byte advances the
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScanState {
    /// Byte offset.
    pub offset: u64,
    /// 0-based line.
    pub line: u64,
    /// 0-based column.
    pub column: u64,
}

impl ScanState {
    /// Returns the state after consuming `byte`.
    #[inline]
    pub fn advance(self, byte: u8) -> Self {
        if byte == b'\n' {
            Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 0,
            }
        } else {
            Self {
                offset: self.offset + 1,
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl From<ScanState> for TextPosition {
    fn from(state: ScanState) -> Self {
        TextPosition::at(state.offset, state.line, state.column)
    }
}

/// A `[start, end)` span found by the splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Inclusive start.
    pub start: ScanState,
    /// Exclusive end.
    pub end: ScanState,
}

impl Span {
    /// Returns the span as plain offsets.
    pub fn offsets(&self) -> std::ops::Range<u64> {
        self.start.offset..self.end.offset
    }

    /// Returns the number of bytes covered.
    pub fn len(&self) -> u64 {
        self.end.offset - self.start.offset
    }

    /// Returns true for a zero-length span.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    Text,
    Newline,
    EmptyLine,
    EmptyBlock,
}

/// Stateful blank-run splitter with a `push()`/`finish()` streaming API.
///
/// # Example
///
/// ```
/// use chunkdelta::BlockSplitter;
///
/// let mut splitter = BlockSplitter::new();
/// let mut spans = splitter.push(b"alpha\n\nbe");
/// spans.extend(splitter.push(b"ta"));
/// spans.extend(splitter.finish());
///
/// let offsets: Vec<_> = spans.iter().map(|s| s.offsets()).collect();
/// assert_eq!(offsets, vec![0..5, 5..7, 7..11]);
/// ```
#[derive(Debug, Clone)]
pub struct BlockSplitter {
    state: LineState,
    scan: ScanState,
    chunk_start: ScanState,
    first_eol: Option<ScanState>,
    last_eol: Option<ScanState>,
    carriage_return: Option<ScanState>,
}

impl BlockSplitter {
    /// Creates a splitter at the start of a stream.
    pub fn new() -> Self {
        Self {
            state: LineState::Text,
            scan: ScanState::default(),
            chunk_start: ScanState::default(),
            first_eol: None,
            last_eol: None,
            carriage_return: None,
        }
    }

    /// Feeds one byte, appending any closed spans to `out`.
    #[inline]
    pub fn update(&mut self, byte: u8, out: &mut Vec<Span>) {
        let here = self.scan;
        let next = here.advance(byte);

        match byte {
            b'\n' => {
                if self.state == LineState::Text {
                    self.state = LineState::Newline;
                    self.first_eol = Some(self.carriage_return.unwrap_or(here));
                } else {
                    self.state = LineState::EmptyBlock;
                }
                self.last_eol = Some(next);
                self.carriage_return = None;
            }
            b'\r' => {
                self.carriage_return = Some(here);
            }
            b' ' | b'\t' => {
                if self.state == LineState::Newline {
                    self.state = LineState::EmptyLine;
                }
                self.carriage_return = None;
            }
            _ => {
                if self.state == LineState::EmptyBlock {
                    self.close_blank_run(out);
                }
                self.state = LineState::Text;
                self.first_eol = None;
                self.carriage_return = None;
            }
        }

        self.scan = next;
    }

    /// Feeds a slice, returning the spans it closed.
    pub fn push(&mut self, data: &[u8]) -> Vec<Span> {
        let mut spans = Vec::new();
        for &byte in data {
            self.update(byte, &mut spans);
        }
        spans
    }

    /// Flushes the remaining spans at end of stream and resets the splitter.
    ///
    /// A trailing blank run is split like an interior one. An empty stream
    /// yields no spans.
    pub fn finish(&mut self) -> Vec<Span> {
        let mut spans = Vec::new();
        if self.state == LineState::EmptyBlock {
            self.close_blank_run(&mut spans);
        }
        if self.chunk_start.offset < self.scan.offset {
            spans.push(Span {
                start: self.chunk_start,
                end: self.scan,
            });
        }
        self.reset();
        spans
    }

    /// Resets the splitter for a new stream.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Returns the position of the next byte to be scanned.
    pub fn position(&self) -> ScanState {
        self.scan
    }

    /// Returns the start of the span currently being accumulated.
    pub fn pending_start(&self) -> ScanState {
        self.chunk_start
    }

    fn close_blank_run(&mut self, out: &mut Vec<Span>) {
        let (Some(first_eol), Some(last_eol)) = (self.first_eol, self.last_eol) else {
            return;
        };
        if first_eol.offset > self.chunk_start.offset {
            out.push(Span {
                start: self.chunk_start,
                end: first_eol,
            });
        }
        out.push(Span {
            start: first_eol,
            end: last_eol,
        });
        self.chunk_start = last_eol;
        self.first_eol = None;
    }
}

impl Default for BlockSplitter {
    fn default() -> Self {
        Self::new()
    }
}
