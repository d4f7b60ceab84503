//! Change records derived from a [`Delta`].

use bytes::Bytes;

use super::engine::Delta;
use super::source::ChunkSource;
use crate::chunk::{Chunk, ChunkContext};
use crate::error::Result;

/// One step turning the old revision into the new one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Change {
    /// A chunk that only exists in the new revision.
    Create {
        /// The new payload.
        data: Bytes,
        /// The new chunk.
        chunk: Chunk,
        /// Its neighbours in the new revision.
        context: ChunkContext,
    },
    /// A chunk that only exists in the old revision.
    Delete {
        /// The removed chunk.
        chunk: Chunk,
        /// Its neighbours in the old revision.
        context: ChunkContext,
    },
    /// An old chunk edited into a new one.
    Update {
        /// The new payload.
        data: Bytes,
        /// The new chunk.
        chunk: Chunk,
        /// The chunk it replaces.
        origin: Chunk,
        /// Neighbours of the new chunk in the new revision.
        context: ChunkContext,
    },
}

impl Change {
    /// Returns the chunk the change is about.
    pub fn chunk(&self) -> &Chunk {
        match self {
            Change::Create { chunk, .. }
            | Change::Delete { chunk, .. }
            | Change::Update { chunk, .. } => chunk,
        }
    }
}

fn context_in(chunks: &[Chunk], chunk: &Chunk) -> ChunkContext {
    chunks
        .iter()
        .position(|c| c == chunk)
        .map(|index| ChunkContext::of(chunks, index))
        .unwrap_or_default()
}

impl Delta {
    /// Converts the delta into change records.
    ///
    /// Deletes come first, in old-revision order, followed by creates and
    /// updates in new-revision order. Payloads for creates and updates are
    /// loaded from `source`. `old` and `new` must be the sequences the delta
    /// was computed from; they supply each chunk's context.
    pub fn changes<S>(&self, old: &[Chunk], new: &[Chunk], source: &S) -> Result<Vec<Change>>
    where
        S: ChunkSource + ?Sized,
    {
        let mut changes: Vec<Change> = self
            .removed
            .iter()
            .map(|chunk| Change::Delete {
                chunk: chunk.clone(),
                context: context_in(old, chunk),
            })
            .collect();

        let mut forward = Vec::with_capacity(self.added.len() + self.changed.len());
        for chunk in &self.added {
            forward.push(Change::Create {
                data: source.load(chunk)?,
                chunk: chunk.clone(),
                context: context_in(new, chunk),
            });
        }
        for changed in &self.changed {
            forward.push(Change::Update {
                data: source.load(&changed.chunk)?,
                chunk: changed.chunk.clone(),
                origin: changed.origin.clone(),
                context: context_in(new, &changed.chunk),
            });
        }
        forward.sort_by_key(|change| new.iter().position(|c| c == change.chunk()));

        changes.extend(forward);
        Ok(changes)
    }
}
