//! Core chunking engine - the configured [`Chunker`].
//!
//! A binary asset becomes exactly one chunk spanning the whole asset. A text
//! asset is split on blank-line runs by [`BlockSplitter`]. Either way the
//! chunks are gapless, non-overlapping, and cover the asset exactly.
//!
//! # Example
//!
//! ```
//! use chunkdelta::{Chunker, ChunkConfig, Location};
//!
//! let chunker = Chunker::new(ChunkConfig::default());
//! let chunks = chunker.chunk_bytes(Location::from_segments(["a.txt"])?, &b"alpha\n\nbeta"[..]);
//!
//! let ranges: Vec<_> = chunks.iter().map(|c| c.range.offsets()).collect();
//! assert_eq!(ranges, vec![0..5, 5..7, 7..11]);
//! # Ok::<(), chunkdelta::ChunkError>(())
//! ```

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use bytes::Bytes;
use rayon::prelude::*;
use tracing::{debug, warn};

use super::ChunkIter;
use crate::cdc::{BlockSplitter, ContentKind, Span, classify_bytes};
use crate::chunk::{Chunk, Location, Position, Range, Signature};
use crate::config::ChunkConfig;
use crate::error::{ChunkError, Result};

/// A chunker that turns assets into content-defined chunks.
///
/// `Chunker` holds a configuration and is cheap to clone. Chunking is a pure
/// function of the asset bytes and its location: the same bytes always yield
/// the same ranges and signatures.
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkConfig,
}

impl Chunker {
    /// Creates a new chunker with the given configuration.
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration used by this chunker.
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Chunks an in-memory asset.
    ///
    /// An empty asset yields no chunks.
    pub fn chunk_bytes(&self, location: Location, data: impl Into<Bytes>) -> Vec<Chunk> {
        let data = data.into();
        let algorithm = self.config.algorithm();

        if classify_bytes(&data, self.config.binary_sample()) == ContentKind::Binary {
            return vec![Chunk::new(
                location,
                Range::Bytes {
                    start: Position::new(0),
                    end: Position::new(data.len() as u64),
                },
                Signature::of_bytes(algorithm, &data),
            )];
        }

        let mut splitter = BlockSplitter::new();
        let mut spans = splitter.push(&data);
        spans.extend(splitter.finish());

        let chunks: Vec<Chunk> = spans
            .iter()
            .map(|span| {
                let bytes = &data[span.start.offset as usize..span.end.offset as usize];
                text_chunk(&location, span, Signature::of_bytes(algorithm, bytes))
            })
            .collect();

        debug!(location = %location, chunks = chunks.len(), bytes = data.len(), "chunked in-memory asset");
        chunks
    }

    /// Creates a lazy chunking iterator over a seekable reader.
    ///
    /// The reader is scanned in blocks; each chunk's signature is computed by
    /// seeking back over its final range.
    pub fn chunk_reader<R: Read + Seek>(&self, location: Location, reader: R) -> ChunkIter<R> {
        ChunkIter::new(reader, location, self.config, None)
    }

    /// Creates a lazy chunking iterator over the file at `path`.
    ///
    /// # Errors
    ///
    /// - [`ChunkError::OutsideBase`] if `path` is not inside `base`
    /// - [`ChunkError::Asset`] if the file cannot be opened
    pub fn chunk_path(&self, path: &Path, base: &Path) -> Result<ChunkIter<File>> {
        let location = Location::resolve(path, base)?;
        let file = File::open(path).map_err(|e| ChunkError::asset(path, e))?;
        Ok(ChunkIter::new(
            file,
            location,
            self.config,
            Some(path.to_path_buf()),
        ))
    }

    /// Chunks the file at `path` to completion.
    ///
    /// Any error discards the partial result.
    pub fn chunk_file(&self, path: &Path, base: &Path) -> Result<Vec<Chunk>> {
        self.chunk_path(path, base)?.collect()
    }

    /// Chunks many files in parallel.
    ///
    /// Results are returned in input order. A failure only affects the asset
    /// it happened on.
    pub fn chunk_batch<P>(&self, paths: &[P], base: &Path) -> Vec<Result<Vec<Chunk>>>
    where
        P: AsRef<Path> + Sync,
    {
        paths
            .par_iter()
            .map(|path| {
                let path = path.as_ref();
                let result = self.chunk_file(path, base);
                if let Err(e) = &result {
                    warn!(path = %path.display(), error = %e, "skipping asset");
                }
                result
            })
            .collect()
    }
}

pub(super) fn text_chunk(location: &Location, span: &Span, signature: Signature) -> Chunk {
    Chunk::new(
        location.clone(),
        Range::Text {
            start: span.start.into(),
            end: span.end.into(),
        },
        signature,
    )
}
