//! Cross-revision chunk matching.
//!
//! - [`DeltaEngine`] - computes a [`Delta`] from two chunk sequences
//! - [`ChunkSource`] - where the engine loads leftover payloads from
//! - [`Change`] - create/delete/update records derived from a delta
//! - [`tokenize`], [`phonetic_code`], [`similarity`] - the fuzzy scoring pieces

mod change;
mod engine;
mod matcher;
mod phonetic;
mod source;

pub use change::Change;
pub use engine::{Changed, Common, Delta, DeltaEngine};
pub use matcher::{Block, matching_blocks, similarity};
pub use phonetic::{phonetic_code, tokenize};
pub use source::{AssetSource, ChunkSource};
