// Integration tests for the ChunkStore
// Tests cover: round-trips, deduplication, layout, enumeration, concurrency

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use chunkdelta::{
    Chunk, ChunkStore, Chunker, HashAlgorithm, Location, PutOutcome, Range, Signature,
    StoreConfig, encode_key,
};

fn chunk_at(name: &str, data: &[u8]) -> Chunk {
    Chunk::new(
        Location::from_segments([name]).unwrap(),
        Range::bytes(0, data.len() as u64).unwrap(),
        Signature::of_bytes(HashAlgorithm::Sha512, data),
    )
}

// ============================================================================
// Round-trip Tests
// ============================================================================

#[test]
fn test_roundtrip_many_payloads() {
    let dir = tempfile::tempdir().unwrap();
    let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();

    let payloads: Vec<Vec<u8>> = (0..50).map(|i| format!("payload {i}").into_bytes()).collect();
    for (i, payload) in payloads.iter().enumerate() {
        let chunk = chunk_at(&format!("f{i}"), payload);
        store.put(&chunk, payload).unwrap();
    }

    for payload in &payloads {
        let sig = Signature::of_bytes(HashAlgorithm::Sha512, payload);
        assert_eq!(store.get(&sig).unwrap().as_ref(), payload.as_slice());
    }
}

#[test]
fn test_empty_payload_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();
    let chunk = chunk_at("empty", b"");

    assert_eq!(store.put(&chunk, b"").unwrap(), PutOutcome::Stored);
    assert!(store.get(&chunk.signature).unwrap().is_empty());
}

#[test]
fn test_get_is_location_independent() {
    let dir = tempfile::tempdir().unwrap();
    let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();
    store.put(&chunk_at("somewhere.txt", b"data"), b"data").unwrap();

    let sig = Signature::of_bytes(HashAlgorithm::Sha512, b"data");
    assert_eq!(store.get(&sig).unwrap().as_ref(), b"data");
}

// ============================================================================
// Deduplication Tests
// ============================================================================

#[test]
fn test_dedup_across_locations() {
    let dir = tempfile::tempdir().unwrap();
    let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();

    let a = chunk_at("a.txt", b"same bytes");
    let b = chunk_at("b.txt", b"same bytes");
    assert_eq!(store.put(&a, b"same bytes").unwrap(), PutOutcome::Stored);
    assert_eq!(store.put(&b, b"same bytes").unwrap(), PutOutcome::Existing);

    let listed = store.list().signatures();
    assert_eq!(listed, vec![a.signature]);
}

#[test]
fn test_chunked_asset_dedups_separators() {
    let dir = tempfile::tempdir().unwrap();
    let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();
    let data = b"one\n\ntwo\n\nthree";
    let chunks = Chunker::default().chunk_bytes(Location::from_segments(["t"]).unwrap(), &data[..]);
    assert_eq!(chunks.len(), 5);

    let mut stored = 0;
    for chunk in &chunks {
        let r = chunk.range.offsets();
        if store.put(chunk, &data[r.start as usize..r.end as usize]).unwrap() == PutOutcome::Stored {
            stored += 1;
        }
    }
    assert_eq!(stored, 4, "The two blank separators share one object");
    assert_eq!(store.list().count(), 4);
}

// ============================================================================
// Layout Tests
// ============================================================================

#[test]
fn test_on_disk_layout() {
    let dir = tempfile::tempdir().unwrap();
    let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();
    let chunk = chunk_at("x", b"layout");
    store.put(&chunk, b"layout").unwrap();

    let segments = encode_key(&chunk.signature, 10);
    let mut expected = dir.path().to_path_buf();
    for segment in &segments[..segments.len() - 1] {
        expected.push(segment);
    }
    expected.push(format!("{}.chunk", segments[segments.len() - 1]));

    assert_eq!(store.path(&chunk.signature), expected);
    assert_eq!(std::fs::read(&expected).unwrap(), b"layout");
}

#[test]
fn test_custom_segment_width() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::default()
        .with_algorithm(HashAlgorithm::Sha256)
        .with_segment_width(4);
    let store = ChunkStore::open(dir.path(), config).unwrap();

    let sig = Signature::of_bytes(HashAlgorithm::Sha256, b"w");
    let chunk = Chunk::new(
        Location::from_segments(["w"]).unwrap(),
        Range::bytes(0, 1).unwrap(),
        sig.clone(),
    );
    store.put(&chunk, b"w").unwrap();

    let relative = store.path(&sig).strip_prefix(dir.path()).unwrap().to_path_buf();
    // 52 base32 characters in segments of 4
    assert_eq!(relative.components().count(), 13);
    assert_eq!(store.list().signatures(), vec![sig]);
}

#[test]
fn test_reopen_sees_existing_objects() {
    let dir = tempfile::tempdir().unwrap();
    let chunk = chunk_at("x", b"persisted");
    {
        let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();
        store.put(&chunk, b"persisted").unwrap();
    }

    let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();
    assert!(store.contains(&chunk.signature));
    assert_eq!(store.root(), Path::new(dir.path()));
}

// ============================================================================
// Enumeration Tests
// ============================================================================

#[test]
fn test_list_roundtrips_all_signatures() {
    let dir = tempfile::tempdir().unwrap();
    let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();

    let mut expected = HashSet::new();
    for i in 0..20 {
        let data = format!("object {i}");
        let chunk = chunk_at("x", data.as_bytes());
        store.put(&chunk, data.as_bytes()).unwrap();
        expected.insert(chunk.signature);
    }

    let listed: HashSet<_> = store.list().map(Result::unwrap).collect();
    assert_eq!(listed, expected);
}

#[test]
fn test_list_continues_past_bad_entries() {
    let dir = tempfile::tempdir().unwrap();
    let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();
    let good = chunk_at("x", b"good");
    store.put(&good, b"good").unwrap();

    std::fs::create_dir_all(dir.path().join("junk")).unwrap();
    std::fs::write(dir.path().join("junk").join("not-a-key.chunk"), b"?").unwrap();

    let (ok, bad): (Vec<_>, Vec<_>) = store.list().partition(Result::is_ok);
    assert_eq!(ok.len(), 1);
    assert_eq!(bad.len(), 1);
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[test]
fn test_concurrent_puts_of_same_signature() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ChunkStore::open(dir.path(), StoreConfig::default()).unwrap());
    let payload = b"contended payload".repeat(1000);
    let chunk = Arc::new(chunk_at("c", &payload));
    let payload = Arc::new(payload);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let chunk = Arc::clone(&chunk);
            let payload = Arc::clone(&payload);
            thread::spawn(move || store.put(&chunk, &payload).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.get(&chunk.signature).unwrap().as_ref(), payload.as_slice());
    assert_eq!(store.list().count(), 1);
}
