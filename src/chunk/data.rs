//! The Chunk type - a content-signed range of an asset.

use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use bytes::Bytes;

use super::{Location, Range, Signature};
use crate::error::{ChunkError, Result};

/// A content-defined chunk: where it is and what it hashes to.
///
/// The signature is the hash of exactly the bytes `range` covers in the asset
/// at `location`, as of when the chunk was created. Chunks are snapshots and
/// are never re-validated; a later revision produces new chunks.
///
/// # Example
///
/// ```
/// use chunkdelta::{Chunk, HashAlgorithm, Location, Range, Signature};
///
/// let chunk = Chunk::new(
///     Location::from_segments(["notes.txt"])?,
///     Range::bytes(0, 11)?,
///     Signature::of_bytes(HashAlgorithm::Sha512, b"hello world"),
/// );
///
/// assert_eq!(chunk.len(), 11);
/// # Ok::<(), chunkdelta::ChunkError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chunk {
    /// The asset the chunk was cut from.
    pub location: Location,

    /// The byte range within the asset.
    pub range: Range,

    /// The content signature of the range.
    pub signature: Signature,
}

impl Chunk {
    /// Creates a chunk.
    pub fn new(location: Location, range: Range, signature: Signature) -> Self {
        Self {
            location,
            range,
            signature,
        }
    }

    /// Returns the length of the chunk in bytes.
    pub fn len(&self) -> u64 {
        self.range.len()
    }

    /// Returns true if the chunk covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Returns true if the chunk was cut from a binary asset.
    pub fn is_binary(&self) -> bool {
        !self.range.is_text()
    }

    /// Reads the chunk's bytes from an already-open asset.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::Truncated`] if the asset is now shorter than the
    /// chunk's range.
    pub fn read_from<R: Read + Seek>(&self, reader: &mut R) -> Result<Bytes> {
        let start = self.range.start();
        let end = self.range.end();
        reader.seek(SeekFrom::Start(start))?;

        let len = usize::try_from(self.len()).map_err(|_| ChunkError::InvalidRange { start, end })?;
        let mut data = Vec::with_capacity(len);
        let read = reader.by_ref().take(self.len()).read_to_end(&mut data)?;
        if read < len {
            return Err(ChunkError::Truncated {
                start,
                end,
                read: read as u64,
            });
        }
        Ok(Bytes::from(data))
    }

    /// Reads the chunk's bytes from its asset under `base`.
    pub fn read(&self, base: &Path) -> Result<Bytes> {
        let path = self.location.to_path(base);
        let mut file = File::open(&path).map_err(|e| ChunkError::asset(&path, e))?;
        self.read_from(&mut file).map_err(|e| match e {
            ChunkError::Io(source) => ChunkError::asset(&path, source),
            other => other,
        })
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chunk({} @ {}, {} bytes, {})",
            self.location,
            self.range,
            self.len(),
            self.signature
        )
    }
}

/// The chunks logically before and after a chunk in its asset's sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChunkContext {
    /// The preceding chunk, if any.
    pub previous: Option<Chunk>,

    /// The following chunk, if any.
    pub next: Option<Chunk>,
}

impl ChunkContext {
    /// Builds the context of `chunks[index]`.
    ///
    /// An out-of-range index yields an empty context.
    pub fn of(chunks: &[Chunk], index: usize) -> Self {
        if index >= chunks.len() {
            return Self::default();
        }
        Self {
            previous: index.checked_sub(1).map(|i| chunks[i].clone()),
            next: chunks.get(index + 1).cloned(),
        }
    }
}
