//! Payload loaders for chunks.

use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::chunk::Chunk;
use crate::error::Result;
use crate::store::ChunkStore;

/// Loads the payload bytes of a chunk.
///
/// The delta engine only needs payloads for chunks that did not match
/// exactly, so sources are consulted lazily.
pub trait ChunkSource {
    /// Returns the bytes `chunk` covers.
    fn load(&self, chunk: &Chunk) -> Result<Bytes>;
}

impl ChunkSource for ChunkStore {
    fn load(&self, chunk: &Chunk) -> Result<Bytes> {
        self.get(&chunk.signature)
    }
}

impl<F> ChunkSource for F
where
    F: Fn(&Chunk) -> Result<Bytes>,
{
    fn load(&self, chunk: &Chunk) -> Result<Bytes> {
        self(chunk)
    }
}

/// Reads chunks straight from their assets under a base directory.
///
/// The asset must still hold the bytes the chunk was cut from.
#[derive(Debug, Clone)]
pub struct AssetSource {
    base: PathBuf,
}

impl AssetSource {
    /// Creates a source rooted at `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Returns the base directory.
    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl ChunkSource for AssetSource {
    fn load(&self, chunk: &Chunk) -> Result<Bytes> {
        chunk.read(&self.base)
    }
}
