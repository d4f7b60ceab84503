//! Lazy chunk iteration over a seekable reader.

use std::collections::VecDeque;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;

use tracing::{debug, trace};

use super::engine::text_chunk;
use crate::buffer::Buffer;
use crate::cdc::{BlockSplitter, ContentKind, Span, classify};
use crate::chunk::{Chunk, Location, Range, hash_range};
use crate::config::ChunkConfig;
use crate::error::{ChunkError, Result};

/// An iterator that yields chunks from a [`Read`] + [`Seek`] source.
///
/// `ChunkIter` first classifies the asset, then scans it strictly in offset
/// order in blocks of the configured size. Spans closed by the scan are
/// queued, and each one is hashed on demand by seeking back over its range,
/// so memory use stays bounded by the block size.
///
/// After an error the iterator is finished; chunks already yielded for the
/// asset should be discarded by the caller.
///
/// # Example
///
/// ```
/// use chunkdelta::{Chunker, ChunkConfig, Location};
/// use std::io::Cursor;
///
/// let chunker = Chunker::new(ChunkConfig::default());
/// let chunks: Vec<_> = chunker
///     .chunk_reader(Location::from_segments(["a.txt"])?, Cursor::new(b"one\n\ntwo".to_vec()))
///     .collect::<Result<_, _>>()?;
/// assert_eq!(chunks.len(), 3);
/// # Ok::<(), chunkdelta::ChunkError>(())
/// ```
pub struct ChunkIter<R> {
    reader: R,
    location: Location,
    config: ChunkConfig,
    path: Option<PathBuf>,
    kind: Option<ContentKind>,
    splitter: BlockSplitter,
    buffer: Buffer,
    pending: VecDeque<Span>,
    scanned: u64,
    emitted: usize,
    finished: bool,
}

impl<R: Read + Seek> ChunkIter<R> {
    pub(super) fn new(
        reader: R,
        location: Location,
        config: ChunkConfig,
        path: Option<PathBuf>,
    ) -> Self {
        Self {
            reader,
            location,
            buffer: Buffer::take(config.block_size().max(1)),
            config,
            path,
            kind: None,
            splitter: BlockSplitter::new(),
            pending: VecDeque::new(),
            scanned: 0,
            emitted: 0,
            finished: false,
        }
    }

    /// Returns the location chunks are attributed to.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Returns the asset's classification, once known.
    pub fn kind(&self) -> Option<ContentKind> {
        self.kind
    }

    fn classify(&mut self) -> Result<ContentKind> {
        self.reader.seek(SeekFrom::Start(0))?;
        let kind = classify(
            &mut self.reader,
            self.config.block_size(),
            self.config.binary_sample(),
        )?;
        self.kind = Some(kind);
        Ok(kind)
    }

    fn binary_chunk(&mut self) -> Result<Chunk> {
        let len = self.reader.seek(SeekFrom::End(0))?;
        let signature = hash_range(
            &mut self.reader,
            Some(0),
            Some(len),
            self.config.algorithm(),
            self.config.block_size(),
        )?;
        Ok(Chunk::new(
            self.location.clone(),
            Range::bytes(0, len)?,
            signature,
        ))
    }

    fn emit(&mut self, span: Span) -> Result<Chunk> {
        let signature = hash_range(
            &mut self.reader,
            Some(span.start.offset),
            Some(span.end.offset),
            self.config.algorithm(),
            self.config.block_size(),
        )?;
        trace!(location = %self.location, range = ?span.offsets(), "emitting chunk");
        Ok(text_chunk(&self.location, &span, signature))
    }

    /// Scans the next block, queueing any spans it closes.
    fn scan_block(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(self.scanned))?;
        let limit = self.buffer.len();
        let n = self.buffer.fill_from(&mut self.reader, limit)?;
        if n == 0 {
            self.pending.extend(self.splitter.finish());
            self.finished = true;
            return Ok(());
        }
        let mut closed = Vec::new();
        for &byte in &self.buffer[..n] {
            self.splitter.update(byte, &mut closed);
        }
        self.pending.extend(closed);
        self.scanned += n as u64;
        Ok(())
    }

    fn step(&mut self) -> Option<Result<Chunk>> {
        loop {
            if let Some(span) = self.pending.pop_front() {
                return Some(self.emit(span));
            }
            if self.finished {
                return None;
            }

            let kind = match self.kind {
                Some(kind) => kind,
                None => match self.classify() {
                    Ok(kind) => kind,
                    Err(e) => return Some(Err(e)),
                },
            };

            if kind == ContentKind::Binary {
                self.finished = true;
                return Some(self.binary_chunk());
            }

            if let Err(e) = self.scan_block() {
                return Some(Err(e));
            }
        }
    }

    fn with_path(&self, err: ChunkError) -> ChunkError {
        match (err, &self.path) {
            (ChunkError::Io(source), Some(path)) => ChunkError::asset(path, source),
            (other, _) => other,
        }
    }
}

impl<R: Read + Seek> Iterator for ChunkIter<R> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.step()? {
            Ok(chunk) => {
                self.emitted += 1;
                if self.finished && self.pending.is_empty() {
                    debug!(location = %self.location, chunks = self.emitted, "chunked asset");
                }
                Some(Ok(chunk))
            }
            Err(e) => {
                self.finished = true;
                self.pending.clear();
                Some(Err(self.with_path(e)))
            }
        }
    }
}
