//! Response DTOs for Web API.

use serde::Serialize;

use crate::file::{FileEntry, Listing};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Directory listing response.
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    /// Relative path of the listed directory.
    pub path: String,
    /// Entries in the directory.
    pub entries: Vec<EntryResponse>,
}

/// A single directory entry.
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    /// Entry name.
    pub name: String,
    /// Path relative to the storage root.
    pub path: String,
    /// `"directory"` or `"file"`.
    pub kind: &'static str,
    /// Size in bytes (files only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl From<FileEntry> for EntryResponse {
    fn from(entry: FileEntry) -> Self {
        Self {
            name: entry.name,
            path: entry.relative_path,
            kind: if entry.is_dir { "directory" } else { "file" },
            size: entry.size,
        }
    }
}

impl From<Listing> for ListingResponse {
    fn from(listing: Listing) -> Self {
        Self {
            path: listing.path,
            entries: listing.entries.into_iter().map(Into::into).collect(),
        }
    }
}

/// Upload result.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Stored path relative to the storage root.
    pub path: String,
    /// Number of bytes written.
    pub size: u64,
}
