//! Incremental chunk hashing over the supported algorithms.

use bytes::Bytes;
use sha2::{Digest, Sha256, Sha512};

use crate::chunk::{HashAlgorithm, Signature};

/// A hasher that folds bytes into a [`Signature`] of a fixed algorithm.
#[derive(Debug, Clone)]
pub enum ChunkHasher {
    /// SHA-256 state.
    Sha256(Sha256),
    /// SHA-512 state.
    Sha512(Sha512),
    /// BLAKE3 state.
    #[cfg(feature = "hash-blake3")]
    Blake3(Box<blake3::Hasher>),
}

impl ChunkHasher {
    /// Creates a new hasher for `algorithm`.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha256 => ChunkHasher::Sha256(Sha256::new()),
            HashAlgorithm::Sha512 => ChunkHasher::Sha512(Sha512::new()),
            #[cfg(feature = "hash-blake3")]
            HashAlgorithm::Blake3 => ChunkHasher::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    /// Returns the algorithm this hasher computes.
    pub fn algorithm(&self) -> HashAlgorithm {
        match self {
            ChunkHasher::Sha256(_) => HashAlgorithm::Sha256,
            ChunkHasher::Sha512(_) => HashAlgorithm::Sha512,
            #[cfg(feature = "hash-blake3")]
            ChunkHasher::Blake3(_) => HashAlgorithm::Blake3,
        }
    }

    /// Updates the hasher with more data.
    pub fn update(&mut self, data: &[u8]) {
        match self {
            ChunkHasher::Sha256(h) => h.update(data),
            ChunkHasher::Sha512(h) => h.update(data),
            #[cfg(feature = "hash-blake3")]
            ChunkHasher::Blake3(h) => {
                h.update(data);
            }
        }
    }

    /// Finalizes and returns the signature, leaving the hasher reset.
    pub fn finalize_reset(&mut self) -> Signature {
        let algorithm = self.algorithm();
        let digest = match self {
            ChunkHasher::Sha256(h) => Bytes::copy_from_slice(&h.finalize_reset()),
            ChunkHasher::Sha512(h) => Bytes::copy_from_slice(&h.finalize_reset()),
            #[cfg(feature = "hash-blake3")]
            ChunkHasher::Blake3(h) => {
                let digest = Bytes::copy_from_slice(h.finalize().as_bytes());
                h.reset();
                digest
            }
        };
        Signature::from_trusted(algorithm, digest)
    }

    /// Finalizes and returns the signature.
    pub fn finalize(mut self) -> Signature {
        self.finalize_reset()
    }

    /// Resets the hasher to its initial state.
    pub fn reset(&mut self) {
        *self = Self::new(self.algorithm());
    }

    /// Convenience method to hash data in one shot.
    pub fn hash(algorithm: HashAlgorithm, data: &[u8]) -> Signature {
        let mut hasher = Self::new(algorithm);
        hasher.update(data);
        hasher.finalize()
    }
}
