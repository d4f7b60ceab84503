//! Chunk data model.
//!
//! - [`Position`], [`TextPosition`], [`Range`] - where a chunk lies in its asset
//! - [`Location`] - which asset, relative to a base directory
//! - [`HashAlgorithm`], [`Signature`] - content identity
//! - [`Chunk`], [`ChunkContext`] - the chunk itself and its neighbours

mod data;
mod location;
mod position;
mod signature;

pub use data::{Chunk, ChunkContext};
pub use location::Location;
pub use position::{Position, Range, TextPosition};
pub use signature::{HashAlgorithm, Signature};

pub(crate) use signature::hash_range;
