//! Error types for chunkdelta.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::chunk::{HashAlgorithm, Signature};

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, ChunkError>;

/// Errors that can occur while chunking, storing or diffing chunks.
#[derive(Debug, Error)]
pub enum ChunkError {
    /// An I/O error occurred with no more specific context.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// An I/O error occurred on a specific asset or store object.
    #[error("io error on {}: {source}", path.display())]
    Asset {
        /// The asset or store object path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The source ended before the requested byte range was fully read.
    #[error("truncated read: wanted bytes {start}..{end}, source ended after {read} bytes")]
    Truncated {
        /// Requested start offset.
        start: u64,
        /// Requested end offset.
        end: u64,
        /// Number of bytes actually read from `start`.
        read: u64,
    },

    /// A range whose end precedes its start.
    #[error("invalid range: end {end} precedes start {start}")]
    InvalidRange {
        /// Start offset.
        start: u64,
        /// End offset.
        end: u64,
    },

    /// The requested signature is not in the store.
    #[error("chunk not found: {signature}")]
    NotFound {
        /// The missing signature.
        signature: Signature,
    },

    /// A store entry whose path does not decode to a signature.
    #[error("malformed store key {}: {reason}", path.display())]
    Encoding {
        /// The offending store path.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// A digest whose length does not match its algorithm.
    #[error("invalid {algorithm} digest: expected {expected} bytes, got {actual}")]
    InvalidDigest {
        /// The algorithm the digest claims.
        algorithm: HashAlgorithm,
        /// Expected digest length.
        expected: usize,
        /// Actual digest length.
        actual: usize,
    },

    /// A payload does not hash to the signature it was stored or loaded under.
    #[error("signature mismatch: expected {expected}, payload hashes to {actual}")]
    SignatureMismatch {
        /// The signature the payload was supposed to have.
        expected: Signature,
        /// The signature the payload actually has.
        actual: Signature,
    },

    /// A signature uses a different algorithm than the store.
    #[error("algorithm mismatch: store uses {expected}, got {actual}")]
    AlgorithmMismatch {
        /// The store's algorithm.
        expected: HashAlgorithm,
        /// The algorithm that was supplied.
        actual: HashAlgorithm,
    },

    /// An asset path that does not lie strictly inside the base directory.
    #[error("{} is not inside {}", path.display(), base.display())]
    OutsideBase {
        /// The asset path.
        path: PathBuf,
        /// The base directory.
        base: PathBuf,
    },

    /// A location segment that would escape or alias its base.
    #[error("invalid location segment: {segment:?}")]
    InvalidLocation {
        /// The rejected segment.
        segment: String,
    },

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// The caller abandoned a delta computation.
    #[error("delta computation cancelled")]
    Cancelled,
}

impl ChunkError {
    /// Wraps an I/O error with the path it happened on.
    pub(crate) fn asset(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ChunkError::Asset {
            path: path.into(),
            source,
        }
    }

    /// Returns true for the recoverable "signature absent from store" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ChunkError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        let err: ChunkError = io_err.into();
        assert!(matches!(err, ChunkError::Io(_)));
    }

    #[test]
    fn test_asset_display_names_path() {
        let err = ChunkError::asset("/tmp/a.txt", io::Error::other("boom"));
        let s = err.to_string();
        assert!(s.contains("/tmp/a.txt"));
        assert!(s.contains("boom"));
    }

    #[test]
    fn test_display_range() {
        let err = ChunkError::InvalidRange { start: 10, end: 4 };
        assert!(err.to_string().contains("end 4 precedes start 10"));
    }

    #[test]
    fn test_not_found_is_recoverable() {
        let signature = Signature::of_bytes(HashAlgorithm::Sha256, b"x");
        let err = ChunkError::NotFound { signature };
        assert!(err.is_not_found());
        assert!(!ChunkError::Cancelled.is_not_found());
    }
}
