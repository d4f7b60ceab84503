//! Strong hash implementations for chunk identity.
//!
//! - [`ChunkHasher`] - incremental hasher for any [`HashAlgorithm`](crate::HashAlgorithm)

mod hasher;

pub use hasher::ChunkHasher;
