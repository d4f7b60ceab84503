//! Configuration for chunking, storage and delta computation.
//!
//! This module provides types to configure each component:
//!
//! - [`ChunkConfig`] - Signature algorithm, read block size, binary sampling
//! - [`StoreConfig`] - Store algorithm, key segment width, read verification
//! - [`DeltaConfig`] - Similarity threshold and matching options
//!
//! # Example
//!
//! ```
//! use chunkdelta::{ChunkConfig, DeltaConfig, HashAlgorithm, StoreConfig};
//!
//! let chunking = ChunkConfig::default().with_algorithm(HashAlgorithm::Sha256);
//! let store = StoreConfig::default().with_algorithm(HashAlgorithm::Sha256);
//! let delta = DeltaConfig::default().with_min_score(4);
//!
//! chunking.validate()?;
//! store.validate()?;
//! assert_eq!(delta.min_score(), 4);
//! # Ok::<(), chunkdelta::ChunkError>(())
//! ```

use crate::chunk::HashAlgorithm;
use crate::error::ChunkError;

/// Default read block size (64 KiB).
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// Default store key segment width, in base32 characters.
pub const DEFAULT_SEGMENT_WIDTH: usize = 10;

/// Default minimum similarity score for pairing changed chunks.
///
/// A single shared token forms one matching block of length 1, which scores 2.
pub const DEFAULT_MIN_SCORE: u32 = 2;

/// Configuration for chunking assets.
///
/// # Example
///
/// ```
/// use chunkdelta::{ChunkConfig, HashAlgorithm};
///
/// let config = ChunkConfig::default()
///     .with_algorithm(HashAlgorithm::Sha256)
///     .with_block_size(8192)
///     .with_binary_sample(Some(4096));
/// assert_eq!(config.block_size(), 8192);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkConfig {
    /// Hash algorithm for chunk signatures.
    algorithm: HashAlgorithm,

    /// Size of each block read from an asset.
    block_size: usize,

    /// How many leading bytes to inspect for binary content (`None`: all).
    binary_sample: Option<u64>,
}

impl ChunkConfig {
    /// Creates a new configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if `block_size` is zero.
    pub fn new(algorithm: HashAlgorithm, block_size: usize) -> Result<Self, ChunkError> {
        if block_size == 0 {
            return Err(ChunkError::InvalidConfig {
                message: "block_size must be non-zero",
            });
        }

        Ok(Self {
            algorithm,
            block_size,
            binary_sample: None,
        })
    }

    /// Sets the signature algorithm.
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the read block size.
    ///
    /// Note: This does not validate the configuration. Use [`ChunkConfig::validate`]
    /// to check if the configuration is valid.
    pub fn with_block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    /// Limits binary detection to the first `sample` bytes.
    pub fn with_binary_sample(mut self, sample: Option<u64>) -> Self {
        self.binary_sample = sample;
        self
    }

    /// Returns the signature algorithm.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Returns the read block size.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the binary detection sample limit.
    pub fn binary_sample(&self) -> Option<u64> {
        self.binary_sample
    }

    /// Validates the current configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use chunkdelta::ChunkConfig;
    ///
    /// let config = ChunkConfig::default().with_block_size(0);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ChunkError> {
        Self::new(self.algorithm, self.block_size).map(|_| ())
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            block_size: DEFAULT_BLOCK_SIZE,
            binary_sample: None,
        }
    }
}

/// Configuration for a [`ChunkStore`](crate::ChunkStore).
///
/// The algorithm is part of the store's identity: keys only encode digest
/// bytes, so every object in one store must use the same algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreConfig {
    algorithm: HashAlgorithm,
    segment_width: usize,
    verify_reads: bool,
}

impl StoreConfig {
    /// Creates a new store configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if `segment_width` is zero.
    pub fn new(algorithm: HashAlgorithm, segment_width: usize) -> Result<Self, ChunkError> {
        if segment_width == 0 {
            return Err(ChunkError::InvalidConfig {
                message: "segment_width must be non-zero",
            });
        }
        Ok(Self {
            algorithm,
            segment_width,
            verify_reads: false,
        })
    }

    /// Sets the algorithm of stored signatures.
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the key segment width.
    ///
    /// Note: This does not validate the configuration.
    pub fn with_segment_width(mut self, width: usize) -> Self {
        self.segment_width = width;
        self
    }

    /// Re-hashes payloads on `get` and fails on mismatch.
    pub fn with_verify_reads(mut self, verify: bool) -> Self {
        self.verify_reads = verify;
        self
    }

    /// Returns the algorithm of stored signatures.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Returns the key segment width.
    pub fn segment_width(&self) -> usize {
        self.segment_width
    }

    /// Returns whether reads are verified.
    pub fn verify_reads(&self) -> bool {
        self.verify_reads
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), ChunkError> {
        Self::new(self.algorithm, self.segment_width).map(|_| ())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            segment_width: DEFAULT_SEGMENT_WIDTH,
            verify_reads: false,
        }
    }
}

/// Configuration for the [`DeltaEngine`](crate::DeltaEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeltaConfig {
    /// Pairs scoring below this are left as removed/added.
    min_score: u32,

    /// Score added per neighbour whose signature matches on both sides.
    adjacency_bonus: u32,

    /// Whether to score candidate pairs on the rayon thread pool.
    parallel: bool,
}

impl DeltaConfig {
    /// Creates a configuration with the given minimum score.
    pub const fn new(min_score: u32) -> Self {
        Self {
            min_score,
            adjacency_bonus: 0,
            parallel: true,
        }
    }

    /// Sets the minimum similarity score.
    ///
    /// # Example
    ///
    /// ```
    /// use chunkdelta::DeltaConfig;
    ///
    /// // Any text pair is matchable
    /// let config = DeltaConfig::default().with_min_score(0);
    /// assert_eq!(config.min_score(), 0);
    /// ```
    pub fn with_min_score(mut self, min_score: u32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Sets the neighbour adjacency bonus (0 disables it).
    pub fn with_adjacency_bonus(mut self, bonus: u32) -> Self {
        self.adjacency_bonus = bonus;
        self
    }

    /// Enables or disables parallel pair scoring.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns the minimum similarity score.
    pub fn min_score(&self) -> u32 {
        self.min_score
    }

    /// Returns the neighbour adjacency bonus.
    pub fn adjacency_bonus(&self) -> u32 {
        self.adjacency_bonus
    }

    /// Returns whether pair scoring runs in parallel.
    pub fn parallel(&self) -> bool {
        self.parallel
    }
}

impl Default for DeltaConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SCORE)
    }
}
