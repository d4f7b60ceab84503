#![no_main]

use std::collections::HashMap;

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use chunkdelta::{Chunk, ChunkError, Chunker, DeltaConfig, DeltaEngine, Location, Signature};

fuzz_target!(|input: (Vec<u8>, Vec<u8>, u8)| {
    let (old, new, min_score) = input;
    let location = Location::from_segments(["fuzz"]).unwrap();
    let chunker = Chunker::default();
    let (old, new) = (Bytes::from(old), Bytes::from(new));
    let old_chunks = chunker.chunk_bytes(location.clone(), old.clone());
    let new_chunks = chunker.chunk_bytes(location, new.clone());

    let mut payloads: HashMap<Signature, Bytes> = HashMap::new();
    for (data, chunks) in [(&old, &old_chunks), (&new, &new_chunks)] {
        for chunk in chunks.iter() {
            let r = chunk.range.offsets();
            payloads.insert(chunk.signature.clone(), data.slice(r.start as usize..r.end as usize));
        }
    }
    let source = |chunk: &Chunk| -> Result<Bytes, ChunkError> {
        Ok(payloads[&chunk.signature].clone())
    };

    let engine = DeltaEngine::new(DeltaConfig::default().with_min_score(u32::from(min_score % 8)));
    let delta = engine.compute(&old_chunks, &new_chunks, &source).unwrap();

    // Verify: every chunk is accounted for exactly once
    let old_seen: usize = delta.common.iter().map(|c| c.old.len()).sum::<usize>()
        + delta.changed.len()
        + delta.removed.len();
    let new_seen: usize = delta.common.iter().map(|c| c.new.len()).sum::<usize>()
        + delta.changed.len()
        + delta.added.len();
    assert_eq!(old_seen, old_chunks.len());
    assert_eq!(new_seen, new_chunks.len());

    // Verify: fuzzy pairs never involve binary chunks
    for changed in &delta.changed {
        assert!(!changed.origin.is_binary() && !changed.chunk.is_binary());
    }
});
