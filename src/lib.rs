//! chunkdelta
//!
//! Content-defined chunking, content-addressed storage and chunk-level deltas.
//!
//! `chunkdelta` cuts assets into chunks on blank-line runs (text) or keeps
//! them whole (binary), signs every chunk with a cryptographic digest, stores
//! payloads by signature, and compares two revisions chunk by chunk:
//!
//! - identical chunks are matched by signature, wherever they moved
//! - edited text chunks are paired by phonetic token similarity
//! - whatever is left is reported as removed or added
//!
//! The crate intentionally:
//! - does NOT walk directory trees
//! - does NOT read file metadata
//! - does NOT coordinate multiple writers
//!
//! # Chunking and storing
//!
//! ```no_run
//! use std::path::Path;
//! use chunkdelta::{ChunkError, ChunkStore, Chunker, StoreConfig};
//!
//! fn main() -> Result<(), ChunkError> {
//!     let base = Path::new("project");
//!     let store = ChunkStore::open("objects", StoreConfig::default())?;
//!     let chunker = Chunker::default();
//!
//!     for chunk in chunker.chunk_path(&base.join("src/main.rs"), base)? {
//!         let chunk = chunk?;
//!         store.put_from_asset(&chunk, base)?;
//!         println!("{chunk}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Comparing revisions
//!
//! ```no_run
//! use std::path::Path;
//! use chunkdelta::{ChunkError, ChunkStore, Chunker, DeltaEngine, StoreConfig};
//!
//! fn main() -> Result<(), ChunkError> {
//!     let store = ChunkStore::open("objects", StoreConfig::default())?;
//!     let chunker = Chunker::default();
//!
//!     let old = chunker.chunk_file(Path::new("v0/notes.txt"), Path::new("v0"))?;
//!     let new = chunker.chunk_file(Path::new("v1/notes.txt"), Path::new("v1"))?;
//!     for chunk in &old {
//!         store.put_from_asset(chunk, Path::new("v0"))?;
//!     }
//!     for chunk in &new {
//!         store.put_from_asset(chunk, Path::new("v1"))?;
//!     }
//!
//!     let delta = DeltaEngine::default().compute(&old, &new, &store)?;
//!     for change in delta.changes(&old, &new, &store)? {
//!         println!("{change:?}");
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chunk;
mod chunker;
mod config;
mod delta;
mod error;
mod store;

mod buffer; // internal (thread-local reuse)
mod cdc; // internal blank-run splitter
mod hash; // internal hasher dispatch

//
// Public surface (intentionally small)
//

pub use cdc::{
    BlockSplitter, ContentKind, ScanState, Span, classify, classify_bytes, is_disallowed_byte,
};
pub use chunk::{Chunk, ChunkContext, HashAlgorithm, Location, Position, Range, Signature, TextPosition};
pub use chunker::{ChunkIter, Chunker};
pub use config::{
    ChunkConfig, DEFAULT_BLOCK_SIZE, DEFAULT_MIN_SCORE, DEFAULT_SEGMENT_WIDTH, DeltaConfig,
    StoreConfig,
};
pub use delta::{
    AssetSource, Block, Change, Changed, ChunkSource, Common, Delta, DeltaEngine, matching_blocks,
    phonetic_code, similarity, tokenize,
};
pub use error::{ChunkError, Result};
pub use hash::ChunkHasher;
pub use store::{
    ChunkStore, OBJECT_EXTENSION, PutOutcome, StoreIter, decode_key, encode_key, object_path,
};
