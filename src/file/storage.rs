//! Atomic file writes for uploads.
//!
//! Upload bodies are streamed into a hidden temporary file next to the
//! target and renamed over it once complete:
//! ```text
//! {dir}/
//! ├── report.pdf                          <- readers only ever see this
//! └── .upload-3f2a...-9c1d.part           <- in-flight body
//! ```
//! A reader opening `report.pdf` concurrently sees either the old complete
//! content or the new complete content. If the upload fails or the request
//! is dropped, the temporary file is removed.

use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};

use futures::{Stream, StreamExt};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::{FileAccessError, Result};

/// Prefix of in-flight upload files.
pub const TEMP_FILE_PREFIX: &str = ".upload-";

/// Suffix of in-flight upload files.
pub const TEMP_FILE_SUFFIX: &str = ".part";

/// Whether a directory entry name belongs to an in-flight upload.
pub fn is_temp_file_name(name: &str) -> bool {
    name.starts_with(TEMP_FILE_PREFIX) && name.ends_with(TEMP_FILE_SUFFIX)
}

/// Removes the temporary file on drop unless disarmed.
#[derive(Debug)]
struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(error = %e, "Failed to remove partial upload");
                }
            } else {
                tracing::debug!("Discarded partial upload");
            }
        }
    }
}

/// Writes a file through a temporary sibling and an atomic rename.
#[derive(Debug)]
pub struct AtomicWriter {
    // Field order matters: the handle closes before the guard removes the file.
    file: File,
    temp: TempFileGuard,
    target: PathBuf,
    written: u64,
    limit: u64,
}

impl AtomicWriter {
    /// Create a writer for `target`, accepting at most `limit` bytes.
    ///
    /// The parent directory of `target` must already exist.
    pub async fn create(target: &Path, limit: u64) -> Result<Self> {
        let parent = target.parent().ok_or_else(|| {
            FileAccessError::Validation("upload target has no parent directory".to_string())
        })?;

        let temp_path = parent.join(format!(
            "{TEMP_FILE_PREFIX}{}{TEMP_FILE_SUFFIX}",
            Uuid::new_v4()
        ));

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .await?;

        Ok(Self {
            file,
            temp: TempFileGuard {
                path: temp_path,
                armed: true,
            },
            target: target.to_path_buf(),
            written: 0,
            limit,
        })
    }

    /// Number of bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Append a chunk, failing once the size limit is exceeded.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        let len = chunk.len() as u64;
        if self.written.saturating_add(len) > self.limit {
            return Err(FileAccessError::PayloadTooLarge(self.limit));
        }

        self.file.write_all(chunk).await?;
        self.written += len;
        Ok(())
    }

    /// Drain a body stream into the file and commit it.
    ///
    /// A stream error (e.g. the client went away mid-body) aborts the write
    /// and discards the partial file.
    pub async fn write_stream<S, B, E>(mut self, stream: S) -> Result<u64>
    where
        S: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Display,
    {
        let mut stream = std::pin::pin!(stream);

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                FileAccessError::Io(io::Error::new(
                    io::ErrorKind::ConnectionAborted,
                    format!("upload body interrupted: {e}"),
                ))
            })?;
            self.write_chunk(chunk.as_ref()).await?;
        }

        self.commit().await
    }

    /// Flush to disk and atomically replace the target.
    pub async fn commit(self) -> Result<u64> {
        let Self {
            mut file,
            mut temp,
            target,
            written,
            ..
        } = self;

        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp.path, &target).await?;
        temp.disarm();

        Ok(written)
    }
}
