//! Content-addressed chunk storage.
//!
//! - [`ChunkStore`] - put/get/contains/delete over a sharded directory tree
//! - [`StoreIter`] - lazy enumeration of stored signatures
//! - [`encode_key`] / [`decode_key`] - the base32 path layout

mod fs;
mod key;
mod list;

pub use fs::{ChunkStore, PutOutcome};
pub use key::{OBJECT_EXTENSION, decode_key, encode_key, object_path};
pub use list::StoreIter;
