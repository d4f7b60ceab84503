//! The delta engine: exact matching followed by phonetic fuzzy pairing.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, trace};

use super::matcher::similarity;
use super::phonetic::{phonetic_code, tokenize};
use super::source::ChunkSource;
use crate::chunk::{Chunk, ChunkContext, Signature};
use crate::config::DeltaConfig;
use crate::error::{ChunkError, Result};

/// Chunks that appear unchanged in both revisions.
///
/// Every occurrence of the shared signature is listed on both sides, so a
/// signature repeated within one revision is still accounted for once per
/// chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Common {
    /// The shared signature.
    pub signature: Signature,
    /// Occurrences in the old revision, in order.
    pub old: Vec<Chunk>,
    /// Occurrences in the new revision, in order.
    pub new: Vec<Chunk>,
}

/// An old chunk judged to have been edited into a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Changed {
    /// The chunk in the old revision.
    pub origin: Chunk,
    /// The chunk in the new revision.
    pub chunk: Chunk,
    /// The similarity score the pair was matched with.
    pub score: u32,
}

/// The classified difference between two chunk sequences.
///
/// Every old chunk appears in exactly one of `common` (old side), `changed`
/// (as `origin`) or `removed`; every new chunk in exactly one of `common`
/// (new side), `changed` (as `chunk`) or `added`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Delta {
    /// Shared signatures, in order of first occurrence in the old revision.
    pub common: Vec<Common>,
    /// Fuzzy-matched pairs, in old-revision order.
    pub changed: Vec<Changed>,
    /// Old chunks with no counterpart, in old-revision order.
    pub removed: Vec<Chunk>,
    /// New chunks with no counterpart, in new-revision order.
    pub added: Vec<Chunk>,
}

impl Delta {
    /// Returns true when the two revisions hold the same chunks.
    pub fn is_unchanged(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty() && self.added.is_empty()
    }
}

/// Computes [`Delta`]s between chunk sequences.
///
/// Phase 1 matches chunks by signature, regardless of position. Phase 2
/// pairs the leftover text chunks by similarity of their phonetic token
/// sequences, greedily taking the best-scoring pair first. Binary chunks
/// only ever match exactly.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use chunkdelta::{Chunk, ChunkError, Chunker, DeltaConfig, DeltaEngine, Location};
///
/// let chunker = Chunker::default();
/// let location = Location::from_segments(["notes.txt"])?;
/// let v0 = Bytes::from_static(b"alpha\n\nbeta");
/// let v1 = Bytes::from_static(b"alpha\n\ngamma");
/// let old = chunker.chunk_bytes(location.clone(), v0.clone());
/// let new = chunker.chunk_bytes(location, v1.clone());
///
/// let source = |chunk: &Chunk| -> Result<Bytes, ChunkError> {
///     let data = if old.contains(chunk) { &v0 } else { &v1 };
///     let range = chunk.range.offsets();
///     Ok(data.slice(range.start as usize..range.end as usize))
/// };
///
/// let delta = DeltaEngine::new(DeltaConfig::default()).compute(&old, &new, &source)?;
/// assert_eq!(delta.common.len(), 2);
/// assert_eq!(delta.removed.len(), 1);
/// assert_eq!(delta.added.len(), 1);
/// # Ok::<(), ChunkError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeltaEngine {
    config: DeltaConfig,
}

struct Candidate<'a> {
    index: usize,
    chunk: &'a Chunk,
}

impl DeltaEngine {
    /// Creates an engine with the given configuration.
    pub fn new(config: DeltaConfig) -> Self {
        Self { config }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &DeltaConfig {
        &self.config
    }

    /// Computes the delta from `old` to `new`.
    ///
    /// `source` is only asked for payloads of text chunks left over after
    /// exact matching.
    ///
    /// # Errors
    ///
    /// Propagates any error from `source`.
    pub fn compute<S>(&self, old: &[Chunk], new: &[Chunk], source: &S) -> Result<Delta>
    where
        S: ChunkSource + ?Sized,
    {
        self.compute_with_cancel(old, new, source, &AtomicBool::new(false))
    }

    /// Like [`compute`](Self::compute), but gives up with
    /// [`ChunkError::Cancelled`] once `cancel` is set.
    ///
    /// The flag is checked between pair evaluations. Nothing is written
    /// anywhere before the delta is returned, so abandoning is always safe.
    pub fn compute_with_cancel<S>(
        &self,
        old: &[Chunk],
        new: &[Chunk],
        source: &S,
        cancel: &AtomicBool,
    ) -> Result<Delta>
    where
        S: ChunkSource + ?Sized,
    {
        // Phase 1: exact signature matches
        let old_index = index_by_signature(old);
        let new_index = index_by_signature(new);

        let mut common = Vec::new();
        for (signature, olds) in &old_index {
            if let Some(news) = new_index.get(signature) {
                common.push(Common {
                    signature: (*signature).clone(),
                    old: olds.iter().map(|&i| old[i].clone()).collect(),
                    new: news.iter().map(|&j| new[j].clone()).collect(),
                });
            }
        }

        let removed: Vec<Candidate<'_>> = old
            .iter()
            .enumerate()
            .filter(|(_, c)| !new_index.contains_key(&c.signature))
            .map(|(index, chunk)| Candidate { index, chunk })
            .collect();
        let added: Vec<Candidate<'_>> = new
            .iter()
            .enumerate()
            .filter(|(_, c)| !old_index.contains_key(&c.signature))
            .map(|(index, chunk)| Candidate { index, chunk })
            .collect();

        debug!(
            common = common.len(),
            removed = removed.len(),
            added = added.len(),
            "exact matching done"
        );

        // Phase 2: fuzzy pairing of text chunks
        let removed_text: Vec<&Candidate<'_>> =
            removed.iter().filter(|c| !c.chunk.is_binary()).collect();
        let added_text: Vec<&Candidate<'_>> =
            added.iter().filter(|c| !c.chunk.is_binary()).collect();

        let mut pairs = Vec::new();
        if !removed_text.is_empty() && !added_text.is_empty() {
            let mut interner = Interner::default();
            let removed_tokens = load_tokens(&removed_text, source, &mut interner)?;
            let added_tokens = load_tokens(&added_text, source, &mut interner)?;

            let scores = self.score_pairs(
                old,
                new,
                (&removed_text, &removed_tokens),
                (&added_text, &added_tokens),
                cancel,
            )?;
            pairs = assign(scores, self.config.min_score());
        }

        let mut removed_matched = vec![false; removed_text.len()];
        let mut added_matched = vec![false; added_text.len()];
        let mut changed: Vec<(usize, Changed)> = pairs
            .into_iter()
            .map(|(score, i, j)| {
                removed_matched[i] = true;
                added_matched[j] = true;
                let origin = removed_text[i];
                (
                    origin.index,
                    Changed {
                        origin: origin.chunk.clone(),
                        chunk: added_text[j].chunk.clone(),
                        score,
                    },
                )
            })
            .collect();
        changed.sort_by_key(|(index, _)| *index);

        let paired_old: HashSet<usize> = removed_text
            .iter()
            .zip(&removed_matched)
            .filter(|(_, m)| **m)
            .map(|(c, _)| c.index)
            .collect();
        let paired_new: HashSet<usize> = added_text
            .iter()
            .zip(&added_matched)
            .filter(|(_, m)| **m)
            .map(|(c, _)| c.index)
            .collect();

        let delta = Delta {
            common,
            changed: changed.into_iter().map(|(_, c)| c).collect(),
            removed: removed
                .iter()
                .filter(|c| !paired_old.contains(&c.index))
                .map(|c| c.chunk.clone())
                .collect(),
            added: added
                .iter()
                .filter(|c| !paired_new.contains(&c.index))
                .map(|c| c.chunk.clone())
                .collect(),
        };

        debug!(
            changed = delta.changed.len(),
            removed = delta.removed.len(),
            added = delta.added.len(),
            "fuzzy matching done"
        );
        Ok(delta)
    }

    /// Scores every `(removed, added)` text pair.
    ///
    /// Returns `(score, i, j)` for each pair, indexes into the candidate lists.
    fn score_pairs(
        &self,
        old: &[Chunk],
        new: &[Chunk],
        (removed, removed_tokens): (&[&Candidate<'_>], &[Vec<u32>]),
        (added, added_tokens): (&[&Candidate<'_>], &[Vec<u32>]),
        cancel: &AtomicBool,
    ) -> Result<Vec<(u32, usize, usize)>> {
        let bonus = self.config.adjacency_bonus();
        let width = added.len();

        let score = |pair: usize| -> Option<(u32, usize, usize)> {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            let (i, j) = (pair / width, pair % width);
            let mut score = similarity(&removed_tokens[i], &added_tokens[j]);
            if bonus > 0 {
                let shared = shared_neighbours(old, removed[i].index, new, added[j].index);
                score = score.saturating_add(bonus.saturating_mul(shared));
            }
            trace!(old = removed[i].index, new = added[j].index, score, "scored pair");
            Some((score, i, j))
        };

        let total = removed.len() * width;
        let scores: Option<Vec<_>> = if self.config.parallel() {
            (0..total).into_par_iter().map(score).collect()
        } else {
            (0..total).map(score).collect()
        };

        scores.ok_or(ChunkError::Cancelled)
    }
}

fn index_by_signature(chunks: &[Chunk]) -> IndexMap<&Signature, Vec<usize>> {
    let mut index: IndexMap<&Signature, Vec<usize>> = IndexMap::new();
    for (i, chunk) in chunks.iter().enumerate() {
        index.entry(&chunk.signature).or_default().push(i);
    }
    index
}

/// Maps phonetic codes to dense ids so pair scoring compares integers.
#[derive(Default)]
struct Interner {
    ids: HashMap<String, u32>,
}

impl Interner {
    fn intern(&mut self, code: String) -> u32 {
        let next = self.ids.len() as u32;
        *self.ids.entry(code).or_insert(next)
    }
}

fn load_tokens<S>(
    candidates: &[&Candidate<'_>],
    source: &S,
    interner: &mut Interner,
) -> Result<Vec<Vec<u32>>>
where
    S: ChunkSource + ?Sized,
{
    candidates
        .iter()
        .map(|candidate| {
            let data = source.load(candidate.chunk)?;
            let text = String::from_utf8_lossy(&data);
            Ok(tokenize(&text)
                .into_iter()
                .map(|word| interner.intern(phonetic_code(word)))
                .collect())
        })
        .collect()
}

/// Counts neighbour positions whose chunks share a signature.
fn shared_neighbours(old: &[Chunk], i: usize, new: &[Chunk], j: usize) -> u32 {
    let a = ChunkContext::of(old, i);
    let b = ChunkContext::of(new, j);
    let same = |x: &Option<Chunk>, y: &Option<Chunk>| match (x, y) {
        (Some(x), Some(y)) => x.signature == y.signature,
        _ => false,
    };
    u32::from(same(&a.previous, &b.previous)) + u32::from(same(&a.next, &b.next))
}

/// Greedy assignment: highest score first, ties to the lowest `i`, then `j`.
fn assign(mut scores: Vec<(u32, usize, usize)>, min_score: u32) -> Vec<(u32, usize, usize)> {
    scores.retain(|&(score, _, _)| score >= min_score);
    scores.sort_unstable_by_key(|&(score, i, j)| (Reverse(score), i, j));

    let mut used_old = HashSet::new();
    let mut used_new = HashSet::new();
    let mut pairs = Vec::new();
    for (score, i, j) in scores {
        if used_old.contains(&i) || used_new.contains(&j) {
            continue;
        }
        used_old.insert(i);
        used_new.insert(j);
        pairs.push((score, i, j));
    }
    pairs
}
