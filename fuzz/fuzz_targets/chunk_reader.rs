#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use chunkdelta::{ChunkConfig, Chunker, Location};

fuzz_target!(|input: (u8, Vec<u8>)| {
    let (block, data) = input;
    let location = Location::from_segments(["fuzz"]).unwrap();
    let expected = Chunker::default().chunk_bytes(location.clone(), data.clone());

    // Small blocks force runs and CRLF pairs across block boundaries
    let block_size = usize::from(block % 32) + 1;
    let chunker = Chunker::new(ChunkConfig::default().with_block_size(block_size));
    let streamed: Vec<_> = chunker
        .chunk_reader(location, Cursor::new(data))
        .collect::<Result<_, _>>()
        .unwrap();

    // Verify: streaming agrees with in-memory chunking
    assert_eq!(streamed, expected);
});
