//! Content-defined chunking for text and binary assets.
//!
//! This module contains the core algorithms for identifying chunk boundaries
//! based on content patterns rather than fixed sizes.
//!
//! - [`BlockSplitter`] - blank-run state machine for text
//! - [`ContentKind`] - text/binary classification

mod binary;
mod blocks;

pub use binary::{ContentKind, classify, classify_bytes, is_disallowed_byte};
pub use blocks::{BlockSplitter, ScanState, Span};
