//! Path confinement for the storage root.
//!
//! Every user-supplied path goes through [`PathResolver::resolve`] before it
//! touches the filesystem. A [`ResolvedPath`] can only be produced by the
//! resolver, so holding one means the path was proven to be the root itself
//! or one of its descendants.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{FileAccessError, Result};

/// Maximum length of a relative path in bytes.
pub const MAX_PATH_LENGTH: usize = 4096;

/// Maximum length of a single path component in bytes.
pub const MAX_COMPONENT_LENGTH: usize = 255;

/// A path that has been validated against the storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Canonical absolute location.
    absolute: PathBuf,
    /// Normalized relative form, `/`-separated, empty for the root.
    relative: String,
}

impl ResolvedPath {
    /// Absolute location on disk.
    pub fn as_path(&self) -> &Path {
        &self.absolute
    }

    /// Normalized relative path (`/`-separated, no leading separator).
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Whether this is the storage root itself.
    pub fn is_root(&self) -> bool {
        self.relative.is_empty()
    }

    /// Last component of the relative path, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.relative.rsplit('/').next().filter(|s| !s.is_empty())
    }
}

/// Resolves relative paths into locations confined to a storage root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Canonical storage root.
    root: PathBuf,
}

impl PathResolver {
    /// Create a resolver for the given root.
    ///
    /// The root directory is created if it doesn't exist and then
    /// canonicalized, so symlinks in the configured path are resolved once
    /// up front.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root)?;
        let root = root.canonicalize()?;

        if !root.is_dir() {
            return Err(FileAccessError::Config(format!(
                "storage root {} is not a directory",
                root.display()
            )));
        }

        Ok(Self { root })
    }

    /// Canonical storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a caller-supplied relative path.
    ///
    /// Never creates or modifies anything on disk.
    pub fn resolve(&self, relative: &str) -> Result<ResolvedPath> {
        let segments = normalize(relative)?;

        let mut joined = self.root.clone();
        for segment in &segments {
            joined.push(segment);
        }

        let absolute = canonicalize_existing(&joined)?;
        if !self.contains(&absolute) {
            tracing::warn!(requested = %relative, "Rejected path outside storage root");
            return Err(FileAccessError::Confinement(relative.to_string()));
        }

        Ok(ResolvedPath {
            absolute,
            relative: segments.join("/"),
        })
    }

    /// Whether a canonical path is the root or lies below it.
    ///
    /// `Path::starts_with` compares whole components, so `/data/files2` is
    /// not inside `/data/files`.
    pub fn contains(&self, canonical: &Path) -> bool {
        canonical.starts_with(&self.root)
    }

    /// Re-check confinement of an on-disk location after it was created.
    pub(crate) fn verify(&self, path: &Path, requested: &str) -> Result<()> {
        let canonical = canonicalize_existing(path)?;
        if self.contains(&canonical) {
            Ok(())
        } else {
            tracing::warn!(requested = %requested, "Created path escaped storage root");
            Err(FileAccessError::Confinement(requested.to_string()))
        }
    }
}

/// Lexically normalize a relative path into its segments.
///
/// Both `/` and `\` separate segments. Empty and `.` segments are dropped and
/// `..` pops the previous segment; popping past the root is a confinement
/// failure.
fn normalize(relative: &str) -> Result<Vec<String>> {
    if relative.len() > MAX_PATH_LENGTH {
        return Err(FileAccessError::Validation(format!(
            "path longer than {MAX_PATH_LENGTH} bytes"
        )));
    }
    if relative.chars().any(char::is_control) {
        return Err(FileAccessError::Validation(
            "path contains control characters".to_string(),
        ));
    }

    let mut segments: Vec<String> = Vec::new();
    for segment in relative.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(FileAccessError::Confinement(relative.to_string()));
                }
            }
            name => {
                if name.len() > MAX_COMPONENT_LENGTH {
                    return Err(FileAccessError::Validation(format!(
                        "path component longer than {MAX_COMPONENT_LENGTH} bytes"
                    )));
                }
                segments.push(name.to_string());
            }
        }
    }

    Ok(segments)
}

/// Canonicalize the deepest existing ancestor of `path` and re-append the rest.
///
/// The appended remainder comes from [`normalize`] and holds no `.` or `..`,
/// and none of it exists yet, so it cannot redirect through a symlink.
fn canonicalize_existing(path: &Path) -> Result<PathBuf> {
    let mut existing = path.to_path_buf();
    let mut remainder = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(mut canonical) => {
                for name in remainder.iter().rev() {
                    canonical.push(name);
                }
                return Ok(canonical);
            }
            Err(e) => {
                let Some(name) = existing.file_name().map(|n| n.to_os_string()) else {
                    return Err(e.into());
                };
                remainder.push(name);
                if !existing.pop() {
                    return Err(io::Error::new(io::ErrorKind::NotFound, e).into());
                }
            }
        }
    }
}
