// Property tests for chunking, storage and deltas
// Tests cover: coverage, determinism, store round-trips, delta completeness

use std::collections::HashMap;
use std::io::Cursor;

use bytes::Bytes;
use chunkdelta::{
    Chunk, ChunkConfig, ChunkError, ChunkStore, Chunker, DeltaConfig, DeltaEngine, HashAlgorithm,
    Location, Range, Signature, StoreConfig,
};
use proptest::prelude::*;

/// Text-like bytes with plenty of blank runs, spaces, tabs and CRs.
fn arb_text() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![
            4 => prop::sample::select(b"abcxyz_09".to_vec()),
            3 => Just(b'\n'),
            1 => Just(b'\r'),
            1 => Just(b' '),
            1 => Just(b'\t'),
        ],
        0..400,
    )
}

/// Mostly text, occasionally with a control byte making it binary.
fn arb_asset() -> impl Strategy<Value = Vec<u8>> {
    (arb_text(), prop::option::weighted(0.2, (any::<prop::sample::Index>(), 0u8..0x09)))
        .prop_map(|(mut data, binary)| {
            if let (Some((at, byte)), false) = (binary, data.is_empty()) {
                let i = at.index(data.len());
                data[i] = byte;
            }
            data
        })
}

fn loc() -> Location {
    Location::from_segments(["prop.txt"]).unwrap()
}

fn slice(data: &[u8], chunk: &Chunk) -> Vec<u8> {
    let r = chunk.range.offsets();
    data[r.start as usize..r.end as usize].to_vec()
}

fn payload_map(data: &Bytes, chunks: &[Chunk], map: &mut HashMap<Signature, Bytes>) {
    for chunk in chunks {
        let r = chunk.range.offsets();
        map.insert(chunk.signature.clone(), data.slice(r.start as usize..r.end as usize));
    }
}

proptest! {
    /// Concatenating chunk payloads in order reproduces the asset.
    #[test]
    fn chunks_cover_asset(data in arb_asset()) {
        let chunks = Chunker::default().chunk_bytes(loc(), data.clone());

        let mut offset = 0u64;
        let mut rebuilt = Vec::with_capacity(data.len());
        for chunk in &chunks {
            prop_assert_eq!(chunk.range.start(), offset);
            prop_assert!(!chunk.is_empty());
            offset = chunk.range.end();
            rebuilt.extend(slice(&data, chunk));
        }
        prop_assert_eq!(rebuilt, data);
    }

    /// Every signature is the hash of the chunk's bytes.
    #[test]
    fn signatures_match_payloads(data in arb_text()) {
        let chunker = Chunker::new(ChunkConfig::default().with_algorithm(HashAlgorithm::Sha256));
        for chunk in chunker.chunk_bytes(loc(), data.clone()) {
            prop_assert_eq!(
                chunk.signature.clone(),
                Signature::of_bytes(HashAlgorithm::Sha256, &slice(&data, &chunk))
            );
        }
    }

    /// Streaming with any block size gives the in-memory result.
    #[test]
    fn streaming_is_deterministic(data in arb_asset(), block_size in 1usize..64) {
        let expected = Chunker::default().chunk_bytes(loc(), data.clone());
        let chunker = Chunker::new(ChunkConfig::default().with_block_size(block_size));
        let streamed: Vec<_> = chunker
            .chunk_reader(loc(), Cursor::new(data))
            .collect::<Result<_, _>>()
            .unwrap();
        prop_assert_eq!(streamed, expected);
    }

    /// Every old and new chunk lands in exactly one delta bucket.
    #[test]
    fn delta_is_complete(old in arb_text(), new in arb_text(), min_score in 0u32..6) {
        let chunker = Chunker::default();
        let (old_bytes, new_bytes) = (Bytes::from(old), Bytes::from(new));
        let old_chunks = chunker.chunk_bytes(loc(), old_bytes.clone());
        let new_chunks = chunker.chunk_bytes(loc(), new_bytes.clone());

        let mut payloads = HashMap::new();
        payload_map(&old_bytes, &old_chunks, &mut payloads);
        payload_map(&new_bytes, &new_chunks, &mut payloads);
        let source = |chunk: &Chunk| -> Result<Bytes, ChunkError> {
            Ok(payloads[&chunk.signature].clone())
        };

        let engine = DeltaEngine::new(DeltaConfig::default().with_min_score(min_score));
        let delta = engine.compute(&old_chunks, &new_chunks, &source).unwrap();

        let old_seen = delta.common.iter().map(|c| c.old.len()).sum::<usize>()
            + delta.changed.len()
            + delta.removed.len();
        let new_seen = delta.common.iter().map(|c| c.new.len()).sum::<usize>()
            + delta.changed.len()
            + delta.added.len();
        prop_assert_eq!(old_seen, old_chunks.len());
        prop_assert_eq!(new_seen, new_chunks.len());

        for changed in &delta.changed {
            prop_assert!(changed.score >= min_score);
        }

        // Deterministic, including with parallel scoring turned off
        let again = DeltaEngine::new(engine.config().with_parallel(false))
            .compute(&old_chunks, &new_chunks, &source)
            .unwrap();
        prop_assert_eq!(again, delta);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Stored payloads come back byte for byte.
    #[test]
    fn store_roundtrip(payloads in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..256), 1..8)) {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();

        for payload in &payloads {
            let chunk = Chunk::new(
                loc(),
                Range::bytes(0, payload.len() as u64).unwrap(),
                Signature::of_bytes(HashAlgorithm::Sha512, payload),
            );
            store.put(&chunk, payload).unwrap();
            let stored = store.get(&chunk.signature).unwrap();
            prop_assert_eq!(stored.as_ref(), payload.as_slice());
        }

        let listed = store.list().signatures();
        let mut unique = listed.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(listed.len(), unique.len());
    }
}
