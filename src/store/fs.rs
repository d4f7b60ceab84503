//! Filesystem-backed content-addressed chunk store.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tempfile::Builder;
use tracing::{debug, trace};

use super::StoreIter;
use super::key::{TEMP_PREFIX, encode_key, object_path};
use crate::chunk::{Chunk, Signature};
use crate::config::StoreConfig;
use crate::error::{ChunkError, Result};
use crate::hash::ChunkHasher;

/// What a successful [`ChunkStore::put`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PutOutcome {
    /// A new object was published.
    Stored,
    /// An object with this signature already existed; nothing was written.
    Existing,
}

/// A content-addressed store of chunk payloads rooted at a directory.
///
/// Objects live at `root/<seg>/<seg>/.../<last>.chunk`, where the segments are
/// the base32 encoding of the digest split at the configured width. Payloads
/// are raw chunk bytes with no header or trailer.
///
/// Writes go to a temporary file in the destination directory, are synced,
/// and are then renamed into place, so readers never see a partial object.
///
/// # Example
///
/// ```
/// use chunkdelta::{ChunkStore, Chunker, Location, StoreConfig};
///
/// let dir = tempfile::tempdir()?;
/// let store = ChunkStore::open(dir.path(), StoreConfig::default())?;
///
/// let data = &b"alpha\n\nbeta"[..];
/// let chunks = Chunker::default().chunk_bytes(Location::from_segments(["a.txt"])?, data);
/// for chunk in &chunks {
///     let range = chunk.range.offsets();
///     store.put(chunk, &data[range.start as usize..range.end as usize])?;
/// }
///
/// assert_eq!(store.get(&chunks[2].signature)?.as_ref(), b"beta");
/// # Ok::<(), chunkdelta::ChunkError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ChunkStore {
    root: PathBuf,
    config: StoreConfig,
}

impl ChunkStore {
    /// Opens a store at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// - [`ChunkError::InvalidConfig`] if `config` is invalid
    /// - [`ChunkError::Asset`] if the root cannot be created
    pub fn open(root: impl Into<PathBuf>, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| ChunkError::asset(&root, e))?;
        debug!(root = %root.display(), algorithm = %config.algorithm(), "opened chunk store");
        Ok(Self { root, config })
    }

    /// Returns the store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the key segments for a chunk.
    pub fn key(&self, chunk: &Chunk) -> Vec<String> {
        encode_key(&chunk.signature, self.config.segment_width())
    }

    /// Returns the object path for a signature, whether or not it exists.
    pub fn path(&self, signature: &Signature) -> PathBuf {
        object_path(&self.root, signature, self.config.segment_width())
    }

    /// Stores `data` as the payload of `chunk`.
    ///
    /// Storing a signature that is already present is a successful no-op.
    ///
    /// # Errors
    ///
    /// - [`ChunkError::AlgorithmMismatch`] if the chunk's algorithm is not the store's
    /// - [`ChunkError::SignatureMismatch`] if `data` does not hash to the chunk's signature
    /// - [`ChunkError::Asset`] if writing or publishing fails
    pub fn put(&self, chunk: &Chunk, data: &[u8]) -> Result<PutOutcome> {
        self.check_algorithm(&chunk.signature)?;

        let actual = ChunkHasher::hash(self.config.algorithm(), data);
        if actual != chunk.signature {
            return Err(ChunkError::SignatureMismatch {
                expected: chunk.signature.clone(),
                actual,
            });
        }

        let path = self.path(&chunk.signature);
        if path.is_file() {
            trace!(signature = %chunk.signature, "chunk already stored");
            return Ok(PutOutcome::Existing);
        }

        self.publish(&path, data)
            .map_err(|e| ChunkError::asset(&path, e))?;
        debug!(signature = %chunk.signature, bytes = data.len(), "stored chunk");
        Ok(PutOutcome::Stored)
    }

    /// Reads the chunk's payload from its asset under `base` and stores it.
    pub fn put_from_asset(&self, chunk: &Chunk, base: &Path) -> Result<PutOutcome> {
        if self.contains(&chunk.signature) {
            return Ok(PutOutcome::Existing);
        }
        let data = chunk.read(base)?;
        self.put(chunk, &data)
    }

    /// Returns the payload stored under `signature`.
    ///
    /// # Errors
    ///
    /// - [`ChunkError::NotFound`] if no such object exists
    /// - [`ChunkError::SignatureMismatch`] if read verification is on and the
    ///   payload is corrupt
    /// - [`ChunkError::Asset`] if reading fails
    pub fn get(&self, signature: &Signature) -> Result<Bytes> {
        let path = self.path(signature);
        let data = match fs::read(&path) {
            Ok(data) => Bytes::from(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ChunkError::NotFound {
                    signature: signature.clone(),
                });
            }
            Err(e) => return Err(ChunkError::asset(&path, e)),
        };

        if self.config.verify_reads() {
            let actual = ChunkHasher::hash(signature.algorithm(), &data);
            if &actual != signature {
                return Err(ChunkError::SignatureMismatch {
                    expected: signature.clone(),
                    actual,
                });
            }
        }
        Ok(data)
    }

    /// Returns true if an object exists for `signature`.
    pub fn contains(&self, signature: &Signature) -> bool {
        signature.algorithm() == self.config.algorithm() && self.path(signature).is_file()
    }

    /// Removes the object for `signature`.
    ///
    /// Returns `false` if there was nothing to remove. Emptied key
    /// directories are left in place.
    pub fn delete(&self, signature: &Signature) -> Result<bool> {
        let path = self.path(signature);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(signature = %signature, "deleted chunk");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ChunkError::asset(&path, e)),
        }
    }

    /// Lazily enumerates the signatures in the store.
    ///
    /// Order is directory order. Entries that do not decode to a signature
    /// are yielded as errors; the walk continues past them.
    pub fn list(&self) -> StoreIter {
        StoreIter::new(&self.root, self.config)
    }

    fn check_algorithm(&self, signature: &Signature) -> Result<()> {
        if signature.algorithm() != self.config.algorithm() {
            return Err(ChunkError::AlgorithmMismatch {
                expected: self.config.algorithm(),
                actual: signature.algorithm(),
            });
        }
        Ok(())
    }

    fn publish(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "object path has no parent"))?;
        fs::create_dir_all(dir)?;

        let mut temp = Builder::new().prefix(TEMP_PREFIX).tempfile_in(dir)?;
        temp.write_all(data)?;
        temp.as_file().sync_all()?;

        // A concurrent writer may win the rename; its content is identical.
        temp.persist(path).map_err(|e| e.error)?;

        sync_dir(dir)
    }
}

/// Syncs a directory so a rename inside it is durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{HashAlgorithm, Location, Range};

    fn chunk_of(data: &[u8], algorithm: HashAlgorithm) -> Chunk {
        Chunk::new(
            Location::from_segments(["a.txt"]).unwrap(),
            Range::bytes(0, data.len() as u64).unwrap(),
            Signature::of_bytes(algorithm, data),
        )
    }

    #[test]
    fn test_put_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();
        let chunk = chunk_of(b"payload", HashAlgorithm::Sha512);

        assert_eq!(store.put(&chunk, b"payload").unwrap(), PutOutcome::Stored);
        assert_eq!(store.get(&chunk.signature).unwrap().as_ref(), b"payload");
        assert!(store.contains(&chunk.signature));
    }

    #[test]
    fn test_put_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();
        let chunk = chunk_of(b"same", HashAlgorithm::Sha512);

        assert_eq!(store.put(&chunk, b"same").unwrap(), PutOutcome::Stored);
        assert_eq!(store.put(&chunk, b"same").unwrap(), PutOutcome::Existing);
    }

    #[test]
    fn test_put_rejects_wrong_payload() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();
        let chunk = chunk_of(b"right", HashAlgorithm::Sha512);

        let err = store.put(&chunk, b"wrong").unwrap_err();
        assert!(matches!(err, ChunkError::SignatureMismatch { .. }));
        assert!(!store.path(&chunk.signature).exists());
    }

    #[test]
    fn test_put_rejects_other_algorithm() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();
        let chunk = chunk_of(b"x", HashAlgorithm::Sha256);

        assert!(matches!(
            store.put(&chunk, b"x"),
            Err(ChunkError::AlgorithmMismatch { .. })
        ));
        assert!(!store.contains(&chunk.signature));
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();
        let sig = Signature::of_bytes(HashAlgorithm::Sha512, b"absent");

        let err = store.get(&sig).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_verify_reads_detects_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::default().with_verify_reads(true);
        let store = ChunkStore::open(dir.path(), config).unwrap();
        let chunk = chunk_of(b"original", HashAlgorithm::Sha512);
        store.put(&chunk, b"original").unwrap();

        fs::write(store.path(&chunk.signature), b"tampered").unwrap();
        assert!(matches!(
            store.get(&chunk.signature),
            Err(ChunkError::SignatureMismatch { .. })
        ));
    }

    #[test]
    fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();
        let chunk = chunk_of(b"gone soon", HashAlgorithm::Sha512);
        store.put(&chunk, b"gone soon").unwrap();

        assert!(store.delete(&chunk.signature).unwrap());
        assert!(!store.delete(&chunk.signature).unwrap());
        assert!(store.get(&chunk.signature).unwrap_err().is_not_found());
    }

    #[test]
    fn test_put_from_asset() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("tree");
        fs::create_dir_all(&base).unwrap();
        fs::write(base.join("a.txt"), b"from disk").unwrap();

        let store = ChunkStore::open(dir.path().join("store"), StoreConfig::default()).unwrap();
        let chunk = chunk_of(b"from disk", HashAlgorithm::Sha512);

        assert_eq!(store.put_from_asset(&chunk, &base).unwrap(), PutOutcome::Stored);
        assert_eq!(store.get(&chunk.signature).unwrap().as_ref(), b"from disk");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::open(dir.path(), StoreConfig::default()).unwrap();
        let chunk = chunk_of(b"clean", HashAlgorithm::Sha512);
        store.put(&chunk, b"clean").unwrap();

        let parent = store.path(&chunk.signature).parent().unwrap().to_path_buf();
        let names: Vec<_> = fs::read_dir(parent)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".chunk"));
    }

    #[cfg(unix)]
    #[test]
    fn test_sync_dir_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(sync_dir(dir.path()).is_ok());
        assert!(sync_dir(&dir.path().join("missing")).is_err());
    }
}
