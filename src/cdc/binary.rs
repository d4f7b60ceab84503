//! Text/binary classification.

use std::io::{self, Read};

use crate::buffer::Buffer;

/// Whether an asset is chunked as text or as a single binary blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Split on blank-line runs.
    Text,
    /// Kept whole.
    Binary,
}

/// Returns true for bytes that never occur in text: NUL and the control
/// bytes below tab or in `0x0E..=0x1F`.
///
/// Tab, newline, vertical tab, form feed, carriage return and everything
/// from `0x20` up are allowed.
#[inline]
pub const fn is_disallowed_byte(byte: u8) -> bool {
    byte < 0x09 || (byte >= 0x0E && byte <= 0x1F)
}

/// Classifies an in-memory payload, looking at no more than `sample` bytes.
pub fn classify_bytes(data: &[u8], sample: Option<u64>) -> ContentKind {
    let limit = sample
        .and_then(|s| usize::try_from(s).ok())
        .map_or(data.len(), |s| s.min(data.len()));
    if data[..limit].iter().any(|&b| is_disallowed_byte(b)) {
        ContentKind::Binary
    } else {
        ContentKind::Text
    }
}

/// Classifies a stream by reading it in blocks of `block_size` bytes.
///
/// Reads until the first disallowed byte, the end of the stream, or `sample`
/// bytes, whichever comes first. The reader is left wherever reading stopped.
pub fn classify<R: Read>(
    reader: &mut R,
    block_size: usize,
    sample: Option<u64>,
) -> io::Result<ContentKind> {
    let mut block = Buffer::take(block_size.max(1));
    let mut remaining = sample.unwrap_or(u64::MAX);

    while remaining > 0 {
        let limit = usize::try_from(remaining).unwrap_or(usize::MAX);
        let n = block.fill_from(reader, limit)?;
        if n == 0 {
            break;
        }
        if block[..n].iter().any(|&b| is_disallowed_byte(b)) {
            return Ok(ContentKind::Binary);
        }
        remaining -= n as u64;
    }
    Ok(ContentKind::Text)
}
