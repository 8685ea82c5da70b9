//! File catalog for the storage root.
//!
//! This module provides the operations behind the HTTP handlers:
//! - Directory listing (directories first, case-insensitive by name)
//! - Download target lookup
//! - Upload target preparation and atomic writes

use std::path::Path;

use serde::Serialize;
use tokio::fs;

use super::resolver::{PathResolver, ResolvedPath};
use super::storage::{is_temp_file_name, AtomicWriter};
use crate::{FileAccessError, Result};

/// Metadata describing an entry in a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Entry name.
    pub name: String,
    /// Path relative to the storage root, `/`-separated.
    pub relative_path: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Size in bytes (regular files only).
    pub size: Option<u64>,
}

/// A validated directory listing.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    /// Normalized relative path of the listed directory (empty for the root).
    pub path: String,
    /// Immediate children.
    pub entries: Vec<FileEntry>,
}

/// File operations confined to a single storage root.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    resolver: PathResolver,
    max_upload_bytes: u64,
}

impl FileCatalog {
    /// Create a new catalog.
    pub fn new(resolver: PathResolver, max_upload_bytes: u64) -> Self {
        Self {
            resolver,
            max_upload_bytes,
        }
    }

    /// The path resolver backing this catalog.
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Maximum accepted upload size in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// List the immediate children of a directory.
    ///
    /// Entries whose metadata can't be read (e.g. dangling symlinks) and
    /// in-flight uploads are left out.
    pub async fn list_directory(&self, relative: &str) -> Result<Listing> {
        let dir = self.resolver.resolve(relative)?;

        match fs::metadata(dir.as_path()).await {
            Ok(m) if m.is_dir() => {}
            _ => return Err(FileAccessError::NotFound("directory".to_string())),
        }

        let mut entries = Vec::new();
        let mut reader = fs::read_dir(dir.as_path()).await?;

        while let Some(entry) = reader.next_entry().await? {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    tracing::debug!(name = ?raw, "Skipping entry with non UTF-8 name");
                    continue;
                }
            };
            if is_temp_file_name(&name) {
                continue;
            }

            let metadata = match fs::metadata(entry.path()).await {
                Ok(m) => m,
                Err(e) => {
                    tracing::debug!(name = %name, error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            let relative_path = if dir.is_root() {
                name.clone()
            } else {
                format!("{}/{}", dir.relative(), name)
            };

            entries.push(FileEntry {
                name,
                relative_path,
                is_dir: metadata.is_dir(),
                size: metadata.is_file().then(|| metadata.len()),
            });
        }

        entries.sort_by(|a, b| {
            b.is_dir
                .cmp(&a.is_dir)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(Listing {
            path: dir.relative().to_string(),
            entries,
        })
    }

    /// Resolve a path for download.
    ///
    /// The path must name an existing regular file.
    pub async fn resolve_download(&self, relative: &str) -> Result<ResolvedPath> {
        if relative.trim_matches(['/', '\\']).is_empty() {
            return Err(FileAccessError::Validation("no file provided".to_string()));
        }

        let resolved = self.resolver.resolve(relative)?;
        if resolved.file_name().is_some_and(is_temp_file_name) {
            return Err(FileAccessError::NotFound("file".to_string()));
        }

        match fs::metadata(resolved.as_path()).await {
            Ok(m) if m.is_file() => Ok(resolved),
            _ => Err(FileAccessError::NotFound("file".to_string())),
        }
    }

    /// Resolve a path for upload and create its parent directories.
    ///
    /// Directories are only created after confinement has been established,
    /// and the created parent is checked again afterwards.
    pub async fn prepare_upload_target(&self, relative: &str) -> Result<ResolvedPath> {
        if relative.is_empty() || relative.ends_with(['/', '\\']) {
            return Err(FileAccessError::Validation(
                "upload path must name a file".to_string(),
            ));
        }

        let resolved = self.resolver.resolve(relative)?;
        if resolved.is_root() {
            return Err(FileAccessError::Validation(
                "upload path must name a file".to_string(),
            ));
        }
        if resolved.file_name().is_some_and(is_temp_file_name) {
            return Err(FileAccessError::Validation(
                "upload path uses a reserved name".to_string(),
            ));
        }

        if let Ok(m) = fs::metadata(resolved.as_path()).await {
            if m.is_dir() {
                return Err(FileAccessError::Validation(
                    "upload target is a directory".to_string(),
                ));
            }
        }

        let parent = resolved.as_path().parent().ok_or_else(|| {
            FileAccessError::Validation("upload path must name a file".to_string())
        })?;

        if let Err(e) = fs::create_dir_all(parent).await {
            if blocked_by_file(parent, self.resolver.root()).await {
                return Err(FileAccessError::Validation(
                    "a parent of the upload path is a file".to_string(),
                ));
            }
            return Err(e.into());
        }
        self.resolver.verify(parent, relative)?;

        Ok(resolved)
    }

    /// Open an atomic writer for a prepared upload target.
    pub async fn open_writer(&self, target: &ResolvedPath) -> Result<AtomicWriter> {
        AtomicWriter::create(target.as_path(), self.max_upload_bytes).await
    }
}

/// Whether directory creation failed because an ancestor is not a directory.
async fn blocked_by_file(dir: &Path, root: &Path) -> bool {
    for ancestor in dir.ancestors() {
        if !ancestor.starts_with(root) {
            break;
        }
        match fs::metadata(ancestor).await {
            Ok(m) if !m.is_dir() => return true,
            Ok(_) => return false,
            // Missing, or below a file (ENOTDIR)
            Err(_) => continue,
        }
    }
    false
}
