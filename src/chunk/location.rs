//! Asset locations relative to a base directory.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::{ChunkError, Result};

/// An asset's path relative to a base directory, as ordered segments.
///
/// A location always resolves strictly inside its base: no segment may be
/// empty, `.`, `..`, or contain a path separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    segments: Vec<String>,
}

impl Location {
    /// Builds a location from already-split segments.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidLocation`] for a segment that would alias
    /// or escape the base, and for an empty segment list.
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(ChunkError::InvalidLocation {
                segment: String::new(),
            });
        }
        for segment in &segments {
            if segment.is_empty()
                || segment == "."
                || segment == ".."
                || segment.contains('/')
                || segment.contains('\\')
                || segment.contains('\0')
            {
                return Err(ChunkError::InvalidLocation {
                    segment: segment.clone(),
                });
            }
        }
        Ok(Self { segments })
    }

    /// Creates the location of `path` relative to `base`.
    ///
    /// Both paths are canonicalized first, so symlinks and `..` are resolved
    /// before the containment check.
    ///
    /// # Errors
    ///
    /// - [`ChunkError::Asset`] if either path cannot be canonicalized
    /// - [`ChunkError::OutsideBase`] if `path` is not strictly inside `base`
    pub fn resolve(path: &Path, base: &Path) -> Result<Self> {
        let abs_path = path
            .canonicalize()
            .map_err(|e| ChunkError::asset(path, e))?;
        let abs_base = base
            .canonicalize()
            .map_err(|e| ChunkError::asset(base, e))?;

        let outside = || ChunkError::OutsideBase {
            path: abs_path.clone(),
            base: abs_base.clone(),
        };
        let relative = abs_path.strip_prefix(&abs_base).map_err(|_| outside())?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(name) => {
                    let name = name.to_str().ok_or_else(|| ChunkError::InvalidLocation {
                        segment: name.to_string_lossy().into_owned(),
                    })?;
                    segments.push(name.to_owned());
                }
                _ => return Err(outside()),
            }
        }
        if segments.is_empty() {
            return Err(outside());
        }
        Self::from_segments(segments)
    }

    /// Returns the segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the file name (last segment).
    pub fn name(&self) -> &str {
        // from_segments guarantees at least one segment
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Joins the location onto `base`.
    pub fn to_path(&self, base: &Path) -> PathBuf {
        let mut path = base.to_path_buf();
        path.extend(&self.segments);
        path
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}
