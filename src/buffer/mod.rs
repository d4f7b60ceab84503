//! Internal read-block management.
//!
//! This module provides a thread-local pool of read blocks so that hashing
//! and scanning reuse fixed-size buffers instead of allocating per asset.
//! It is an implementation detail and not part of the public API.

mod pool;

pub(crate) use pool::Buffer;
