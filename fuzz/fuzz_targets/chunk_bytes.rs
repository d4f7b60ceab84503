#![no_main]

use libfuzzer_sys::fuzz_target;
use chunkdelta::{ChunkConfig, Chunker, HashAlgorithm, Location, Signature};

fuzz_target!(|data: Vec<u8>| {
    let location = Location::from_segments(["fuzz"]).unwrap();
    let configs = [
        ChunkConfig::default(),
        ChunkConfig::default().with_algorithm(HashAlgorithm::Sha256),
        ChunkConfig::default().with_algorithm(HashAlgorithm::Blake3),
        // Binary detection only looks at a prefix
        ChunkConfig::default().with_binary_sample(Some(8)),
    ];

    for config in configs {
        let chunker = Chunker::new(config);
        let chunks = chunker.chunk_bytes(location.clone(), data.clone());

        // Verify: chunks tile the input with no gaps and no empty chunks
        let mut expected_offset = 0u64;
        for chunk in &chunks {
            assert_eq!(chunk.range.start(), expected_offset);
            assert!(!chunk.is_empty());
            expected_offset = chunk.range.end();

            // Verify: signature is the digest of the covered bytes
            let r = chunk.range.offsets();
            let payload = &data[r.start as usize..r.end as usize];
            assert_eq!(chunk.signature, Signature::of_bytes(config.algorithm(), payload));
        }
        assert_eq!(expected_offset, data.len() as u64);

        // Verify: binary assets are a single chunk
        if chunks.iter().any(|c| c.is_binary()) {
            assert_eq!(chunks.len(), 1);
        }

        // Verify: determinism - same input produces same chunks
        let again = Chunker::new(config).chunk_bytes(location.clone(), data.clone());
        assert_eq!(chunks, again);
    }
});
