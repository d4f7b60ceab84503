//! Storage keys: base32 digests split into fixed-width path segments.

use std::path::{Component, Path, PathBuf};

use data_encoding::BASE32_NOPAD;

use crate::chunk::{HashAlgorithm, Signature};
use crate::error::{ChunkError, Result};

/// File extension of stored objects.
pub const OBJECT_EXTENSION: &str = "chunk";

/// Prefix of in-flight temporary files; `list()` skips them.
pub const TEMP_PREFIX: &str = ".tmp";

/// Encodes a signature's digest as base32 path segments.
///
/// Every segment but the last is exactly `width` characters long.
///
/// # Example
///
/// ```
/// use chunkdelta::{HashAlgorithm, Signature, encode_key};
///
/// let sig = Signature::of_bytes(HashAlgorithm::Sha256, b"abc");
/// let segments = encode_key(&sig, 10);
/// assert_eq!(segments.len(), 6);
/// assert_eq!(segments.concat().len(), 52);
/// ```
pub fn encode_key(signature: &Signature, width: usize) -> Vec<String> {
    let encoded = BASE32_NOPAD.encode(signature.digest());
    let width = width.max(1);
    encoded
        .as_bytes()
        .chunks(width)
        // base32 output is ASCII, so byte chunks are valid UTF-8
        .map(|part| String::from_utf8_lossy(part).into_owned())
        .collect()
}

/// Returns the object path for `signature` under `root`.
pub fn object_path(root: &Path, signature: &Signature, width: usize) -> PathBuf {
    let mut segments = encode_key(signature, width);
    let mut path = root.to_path_buf();
    if let Some(last) = segments.pop() {
        for segment in segments {
            path.push(segment);
        }
        path.push(format!("{last}.{OBJECT_EXTENSION}"));
    }
    path
}

/// Decodes a store path, relative to the store root, back into a signature.
///
/// # Errors
///
/// Returns [`ChunkError::Encoding`] if the path is not a well-formed key:
/// wrong extension, wrong segment widths, or invalid base32. Returns
/// [`ChunkError::InvalidDigest`] if the decoded digest has the wrong length
/// for `algorithm`.
pub fn decode_key(relative: &Path, algorithm: HashAlgorithm, width: usize) -> Result<Signature> {
    let malformed = |reason: &str| ChunkError::Encoding {
        path: relative.to_path_buf(),
        reason: reason.to_string(),
    };

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                segments.push(part.to_str().ok_or_else(|| malformed("non-UTF-8 segment"))?)
            }
            _ => return Err(malformed("unexpected path component")),
        }
    }

    let last = segments.pop().ok_or_else(|| malformed("empty path"))?;
    let last = last
        .strip_suffix(OBJECT_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .ok_or_else(|| malformed("missing .chunk extension"))?;

    if segments.iter().any(|s| s.len() != width) {
        return Err(malformed("directory segment has the wrong width"));
    }
    if last.is_empty() || last.len() > width {
        return Err(malformed("final segment has the wrong width"));
    }

    let mut encoded = segments.concat();
    encoded.push_str(last);
    let digest = BASE32_NOPAD
        .decode(encoded.as_bytes())
        .map_err(|e| malformed(&e.to_string()))?;

    Signature::new(algorithm, digest)
}
