//! Chunking entry points for in-memory data, readers and files.
//!
//! - [`Chunker`] - Configured chunker with bytes/reader/path/batch entry points
//! - [`ChunkIter`] - Lazy iterator over one asset's chunks

mod engine;
mod iter;

pub use engine::Chunker;
pub use iter::ChunkIter;
