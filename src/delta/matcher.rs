//! Matching-block similarity between token sequences.
//!
//! The matcher finds the longest common contiguous run of tokens, then
//! recurses on the pieces to its left and right, the same decomposition a
//! classic sequence matcher uses. Ties go to the earliest run in `a`, then
//! the earliest in `b`, so results are deterministic.
//!
//! Positions in `b` are indexed by token, so a search only visits pairs of
//! equal tokens instead of every pair.

use std::collections::HashMap;
use std::hash::Hash;

/// A run of `len` equal tokens at `a[a_start..]` and `b[b_start..]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Block {
    /// Start in the first sequence.
    pub a_start: usize,
    /// Start in the second sequence.
    pub b_start: usize,
    /// Number of matching tokens.
    pub len: usize,
}

/// Positions of each token in `b`, in increasing order.
type TokenIndex<'a, T> = HashMap<&'a T, Vec<usize>>;

fn index_tokens<T: Eq + Hash>(b: &[T]) -> TokenIndex<'_, T> {
    let mut index: TokenIndex<'_, T> = HashMap::new();
    for (j, token) in b.iter().enumerate() {
        index.entry(token).or_default().push(j);
    }
    index
}

fn longest_match<T: Eq + Hash>(
    a: &[T],
    b_index: &TokenIndex<'_, T>,
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> Block {
    let mut best = Block {
        a_start: alo,
        b_start: blo,
        len: 0,
    };

    // lengths[&j] is the length of the match ending at (i - 1, j)
    let mut lengths: HashMap<usize, usize> = HashMap::new();
    for (i, token) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next = HashMap::new();
        let positions = b_index.get(token).map(Vec::as_slice).unwrap_or_default();
        let from = positions.partition_point(|&j| j < blo);
        for &j in positions[from..].iter().take_while(|&&j| j < bhi) {
            let k = j
                .checked_sub(1)
                .and_then(|p| lengths.get(&p))
                .copied()
                .unwrap_or(0)
                + 1;
            next.insert(j, k);
            if k > best.len {
                best = Block {
                    a_start: i + 1 - k,
                    b_start: j + 1 - k,
                    len: k,
                };
            }
        }
        lengths = next;
    }
    best
}

/// Returns the matching blocks of `a` and `b`, sorted and with adjacent
/// blocks merged. No zero-length terminator block is included.
pub fn matching_blocks<T: Eq + Hash>(a: &[T], b: &[T]) -> Vec<Block> {
    let b_index = index_tokens(b);
    let mut blocks = Vec::new();
    let mut queue = vec![((0, a.len()), (0, b.len()))];

    while let Some(((alo, ahi), (blo, bhi))) = queue.pop() {
        if alo >= ahi || blo >= bhi {
            continue;
        }
        let block = longest_match(a, &b_index, (alo, ahi), (blo, bhi));
        if block.len == 0 {
            continue;
        }
        blocks.push(block);
        queue.push(((alo, block.a_start), (blo, block.b_start)));
        queue.push((
            (block.a_start + block.len, ahi),
            (block.b_start + block.len, bhi),
        ));
    }

    blocks.sort_unstable();

    let mut merged: Vec<Block> = Vec::with_capacity(blocks.len());
    for block in blocks {
        match merged.last_mut() {
            Some(last)
                if last.a_start + last.len == block.a_start
                    && last.b_start + last.len == block.b_start =>
            {
                last.len += block.len;
            }
            _ => merged.push(block),
        }
    }
    merged
}

/// Scores how similar two token sequences are.
///
/// Each matching block contributes its length plus one. Sequences with
/// nothing in common score 0. The score saturates at `u32::MAX`.
///
/// # Example
///
/// ```
/// use chunkdelta::similarity;
///
/// assert_eq!(similarity(&["a", "b", "c"], &["a", "b", "c"]), 4);
/// assert_eq!(similarity(&["a", "x", "c"], &["a", "y", "c"]), 4);
/// assert_eq!(similarity(&["a"], &["b"]), 0);
/// ```
pub fn similarity<T: Eq + Hash>(a: &[T], b: &[T]) -> u32 {
    matching_blocks(a, b).iter().fold(0u32, |score, block| {
        let len = u32::try_from(block.len).unwrap_or(u32::MAX);
        score.saturating_add(len.saturating_add(1))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_match_prefers_earliest() {
        let a = [1, 2, 9, 1, 2];
        let b = [1, 2];
        let block = longest_match(&a, &index_tokens(&b), (0, a.len()), (0, b.len()));
        assert_eq!(
            block,
            Block {
                a_start: 0,
                b_start: 0,
                len: 2
            }
        );
    }

    #[test]
    fn test_matching_blocks_recurse_both_sides() {
        let a = ["x", "a", "b", "y", "c", "d"];
        let b = ["a", "b", "z", "c", "d", "w"];
        let blocks = matching_blocks(&a, &b);
        assert_eq!(
            blocks,
            vec![
                Block {
                    a_start: 1,
                    b_start: 0,
                    len: 2
                },
                Block {
                    a_start: 4,
                    b_start: 3,
                    len: 2
                },
            ]
        );
        assert_eq!(similarity(&a, &b), 6);
    }

    #[test]
    fn test_blocks_are_merged() {
        // Identical sequences form one block
        let a = [1, 2, 3, 4];
        assert_eq!(matching_blocks(&a, &a).len(), 1);
        assert_eq!(similarity(&a, &a), 5);
    }

    #[test]
    fn test_score_counts_blocks() {
        let a = ["p", "q", "r", "s"];
        let scattered = ["p", "_", "q", "_", "r", "_", "s"];
        assert_eq!(matching_blocks(&a, &scattered).len(), 4);
        assert_eq!(similarity(&a, &scattered), 8);
    }

    #[test]
    fn test_empty_sequences() {
        let empty: [u32; 0] = [];
        assert!(matching_blocks(&empty, &[1]).is_empty());
        assert_eq!(similarity(&empty, &empty), 0);
    }

    /// Full dynamic-programming longest match, for comparison.
    fn table_longest_match(a: &[u32], b: &[u32]) -> Block {
        let mut best = Block {
            a_start: 0,
            b_start: 0,
            len: 0,
        };
        let mut prev = vec![0usize; b.len() + 1];
        for i in 0..a.len() {
            let mut cur = vec![0usize; b.len() + 1];
            for j in 0..b.len() {
                if a[i] == b[j] {
                    cur[j + 1] = prev[j] + 1;
                    if cur[j + 1] > best.len {
                        best = Block {
                            a_start: i + 1 - cur[j + 1],
                            b_start: j + 1 - cur[j + 1],
                            len: cur[j + 1],
                        };
                    }
                }
            }
            prev = cur;
        }
        best
    }

    #[test]
    fn test_indexed_search_matches_full_table() {
        // Small alphabet so ties and repeats are common
        let mut seed = 7u32;
        let mut next = || {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (seed >> 16) % 4
        };
        for _ in 0..50 {
            let a: Vec<u32> = (0..40).map(|_| next()).collect();
            let b: Vec<u32> = (0..30).map(|_| next()).collect();
            let indexed = longest_match(&a, &index_tokens(&b), (0, a.len()), (0, b.len()));
            let table = table_longest_match(&a, &b);
            assert_eq!(indexed, table, "a={a:?} b={b:?}");
        }
    }

    #[test]
    fn test_search_respects_bounds() {
        let a = [1, 2, 3, 1, 2, 3];
        let b = [1, 2, 3, 1, 2, 3];
        // [1, 2, 3] against [2, 3, 1, 2]: both runs have length 2, the
        // one ending first in `a` wins
        let block = longest_match(&a, &index_tokens(&b), (3, 6), (1, 5));
        assert_eq!(
            block,
            Block {
                a_start: 3,
                b_start: 3,
                len: 2
            }
        );
    }

    #[test]
    fn test_large_sequences() {
        // Every 100th token differs, leaving 200 runs of 99
        let a: Vec<u32> = (0..20_000).collect();
        let b: Vec<u32> = (0..20_000)
            .map(|i| if i % 100 == 0 { 1_000_000 + i } else { i })
            .collect();
        assert_eq!(matching_blocks(&a, &b).len(), 200);
        assert_eq!(similarity(&a, &b), 200 * 100);
    }
}
