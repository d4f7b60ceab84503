//! Content signatures.

use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use bytes::Bytes;

use crate::buffer::Buffer;
use crate::config::DEFAULT_BLOCK_SIZE;
use crate::error::{ChunkError, Result};
use crate::hash::ChunkHasher;

/// The hash algorithms a [`Signature`] may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum HashAlgorithm {
    /// SHA-256, 32-byte digests.
    Sha256,
    /// SHA-512, 64-byte digests.
    #[default]
    Sha512,
    /// BLAKE3, 32-byte digests.
    #[cfg(feature = "hash-blake3")]
    Blake3,
}

impl HashAlgorithm {
    /// Returns the digest length in bytes.
    pub const fn digest_len(self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha512 => 64,
            #[cfg(feature = "hash-blake3")]
            HashAlgorithm::Blake3 => 32,
        }
    }

    /// Returns the lowercase algorithm name.
    pub const fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
            #[cfg(feature = "hash-blake3")]
            HashAlgorithm::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A digest together with the algorithm that produced it.
///
/// Two byte-identical inputs always produce equal signatures, which is what
/// makes deduplication and common-chunk detection sound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signature {
    algorithm: HashAlgorithm,
    digest: Bytes,
}

impl Signature {
    /// Creates a signature from raw digest bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidDigest`] if the digest length does not
    /// match the algorithm.
    pub fn new(algorithm: HashAlgorithm, digest: impl Into<Bytes>) -> Result<Self> {
        let digest = digest.into();
        if digest.len() != algorithm.digest_len() {
            return Err(ChunkError::InvalidDigest {
                algorithm,
                expected: algorithm.digest_len(),
                actual: digest.len(),
            });
        }
        Ok(Self { algorithm, digest })
    }

    pub(crate) fn from_trusted(algorithm: HashAlgorithm, digest: Bytes) -> Self {
        debug_assert_eq!(digest.len(), algorithm.digest_len());
        Self { algorithm, digest }
    }

    /// Hashes an in-memory payload.
    pub fn of_bytes(algorithm: HashAlgorithm, data: &[u8]) -> Self {
        ChunkHasher::hash(algorithm, data)
    }

    /// Hashes `[start, end)` of a seekable byte source.
    ///
    /// `start` defaults to 0 and `end` to the end of the source. The range is
    /// read in bounded blocks, so memory use does not grow with its length.
    ///
    /// # Errors
    ///
    /// - [`ChunkError::InvalidRange`] if `end < start`
    /// - [`ChunkError::Truncated`] if the source ends before `end`
    /// - [`ChunkError::Io`] if reading or seeking fails
    pub fn compute<R: Read + Seek>(
        source: &mut R,
        start: Option<u64>,
        end: Option<u64>,
        algorithm: HashAlgorithm,
    ) -> Result<Self> {
        hash_range(source, start, end, algorithm, DEFAULT_BLOCK_SIZE)
    }

    /// Hashes `[start, end)` of the file at `path`.
    pub fn of_path(
        path: &Path,
        start: Option<u64>,
        end: Option<u64>,
        algorithm: HashAlgorithm,
    ) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| ChunkError::asset(path, e))?;
        hash_range(&mut file, start, end, algorithm, DEFAULT_BLOCK_SIZE).map_err(|e| match e {
            ChunkError::Io(source) => ChunkError::asset(path, source),
            other => other,
        })
    }

    /// Returns the algorithm.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Returns the raw digest bytes.
    pub fn digest(&self) -> &Bytes {
        &self.digest
    }

    /// Returns the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut result = String::with_capacity(self.digest.len() * 2);
        for byte in self.digest.iter() {
            result.push(HEX[(byte >> 4) as usize] as char);
            result.push(HEX[(byte & 0xf) as usize] as char);
        }
        result
    }

    /// Parses a hex digest for `algorithm`.
    ///
    /// Returns `None` if the string is not valid hex of the right length.
    pub fn from_hex(algorithm: HashAlgorithm, hex_str: &str) -> Option<Self> {
        if hex_str.len() != algorithm.digest_len() * 2 || !hex_str.is_ascii() {
            return None;
        }
        let mut bytes = Vec::with_capacity(algorithm.digest_len());
        for i in (0..hex_str.len()).step_by(2) {
            bytes.push(u8::from_str_radix(&hex_str[i..i + 2], 16).ok()?);
        }
        Some(Self::from_trusted(algorithm, Bytes::from(bytes)))
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.digest
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.algorithm)?;
        for byte in self.digest.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Hashes `[start, end)` of `source` in blocks of `block_size` bytes.
pub(crate) fn hash_range<R: Read + Seek>(
    source: &mut R,
    start: Option<u64>,
    end: Option<u64>,
    algorithm: HashAlgorithm,
    block_size: usize,
) -> Result<Signature> {
    let start = start.unwrap_or(0);
    if let Some(end) = end {
        if end < start {
            return Err(ChunkError::InvalidRange { start, end });
        }
    }

    source.seek(SeekFrom::Start(start))?;
    let mut hasher = ChunkHasher::new(algorithm);
    let mut block = Buffer::take(block_size.max(1));
    let mut read = 0u64;

    loop {
        let limit = match end {
            Some(end) => {
                let remaining = end - start - read;
                if remaining == 0 {
                    break;
                }
                usize::try_from(remaining).unwrap_or(usize::MAX)
            }
            None => usize::MAX,
        };
        let n = block.fill_from(source, limit)?;
        if n == 0 {
            if let Some(end) = end {
                return Err(ChunkError::Truncated { start, end, read });
            }
            break;
        }
        hasher.update(&block[..n]);
        read += n as u64;
    }

    Ok(hasher.finalize())
}
