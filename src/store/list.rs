//! Lazy enumeration of stored signatures.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use super::key::{TEMP_PREFIX, decode_key};
use crate::chunk::Signature;
use crate::config::StoreConfig;
use crate::error::{ChunkError, Result};

/// A single-pass iterator over the signatures in a [`ChunkStore`](crate::ChunkStore).
///
/// The walk reflects the store as observed while it runs. Entries that do not
/// decode are yielded as [`ChunkError::Encoding`] (or `InvalidDigest`) and the
/// walk continues; I/O failures while walking are yielded as errors too.
/// In-flight temporary files are skipped silently.
pub struct StoreIter {
    root: PathBuf,
    config: StoreConfig,
    walker: walkdir::IntoIter,
}

impl StoreIter {
    pub(super) fn new(root: &Path, config: StoreConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
            walker: WalkDir::new(root).min_depth(1).follow_links(false).into_iter(),
        }
    }

    /// Collects only the decodable signatures, dropping bad entries.
    pub fn signatures(self) -> Vec<Signature> {
        self.filter_map(Result::ok).collect()
    }
}

impl Iterator for StoreIter {
    type Item = Result<Signature>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
                    warn!(path = %path.display(), error = %e, "store walk failed");
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop in store"));
                    return Some(Err(ChunkError::asset(path, source)));
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            if entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(TEMP_PREFIX))
            {
                continue;
            }

            let relative = match entry.path().strip_prefix(&self.root) {
                Ok(relative) => relative,
                Err(_) => continue,
            };
            let decoded = decode_key(relative, self.config.algorithm(), self.config.segment_width());
            if let Err(e) = &decoded {
                warn!(path = %entry.path().display(), error = %e, "skipping malformed store entry");
            }
            return Some(decoded);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{Chunk, HashAlgorithm, Location, Range};
    use crate::store::ChunkStore;
    use std::collections::HashSet;
    use std::fs;

    fn put_text(store: &ChunkStore, text: &[u8]) -> Signature {
        let chunk = Chunk::new(
            Location::from_segments(["x"]).unwrap(),
            Range::bytes(0, text.len() as u64).unwrap(),
            Signature::of_bytes(store.config().algorithm(), text),
        );
        store.put(&chunk, text).unwrap();
        chunk.signature
    }

    #[test]
    fn test_list_reports_each_signature_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();

        let a = put_text(&store, b"a");
        let b = put_text(&store, b"b");
        put_text(&store, b"a");

        let listed: Vec<_> = store.list().collect::<Result<_>>().unwrap();
        assert_eq!(listed.len(), 2);
        let set: HashSet<_> = listed.into_iter().collect();
        assert_eq!(set, HashSet::from([a, b]));
    }

    #[test]
    fn test_list_skips_temp_and_reports_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::default().with_algorithm(HashAlgorithm::Sha256);
        let store = ChunkStore::open(dir.path(), config).unwrap();
        let good = put_text(&store, b"good");

        fs::write(dir.path().join(".tmpABC123"), b"partial").unwrap();
        fs::write(dir.path().join("README"), b"stray").unwrap();

        let items: Vec<_> = store.list().collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items.iter().filter(|r| r.is_err()).count(), 1);
        assert_eq!(store.list().signatures(), vec![good]);
    }

    #[test]
    fn test_list_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();
        assert_eq!(store.list().count(), 0);
    }
}
