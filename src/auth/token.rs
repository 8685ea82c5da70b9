//! Upload token management.
//!
//! Two credentials gate writes:
//! - the upload token, which is replaced after every upload that used it
//! - the super token, which is fixed for the lifetime of the process
//!
//! Both are announced through the log, which is the only channel operators
//! have for learning the current values.

use std::fmt;
use std::sync::Arc;

use rand::rngs::OsRng;
use rand::TryRngCore;
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

use crate::{FileAccessError, Result};

/// Length of the rotating upload token.
pub const UPLOAD_TOKEN_LENGTH: usize = 16;

/// Length of the static super token.
pub const SUPER_TOKEN_LENGTH: usize = 32;

/// Characters used for generated tokens.
const TOKEN_ALPHABET: &[u8; 62] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Bytes at or above this value are rejected (largest multiple of 62 <= 256).
const REJECTION_THRESHOLD: u8 = 248;

/// Characters that would break a token carried in a URL path segment.
const FORBIDDEN_SEED_CHARS: &[char] = &['/', '\\', '?', '#', '%'];

/// Generate a random token of the given length.
///
/// Uses the operating system RNG with rejection sampling, so every
/// character of the alphabet is equally likely.
pub fn generate_token(length: usize) -> Result<String> {
    let mut token = String::with_capacity(length);
    let mut buf = [0u8; 64];

    while token.len() < length {
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| FileAccessError::Token(format!("randomness unavailable: {e}")))?;

        for &byte in buf.iter().filter(|&&b| b < REJECTION_THRESHOLD) {
            if token.len() == length {
                break;
            }
            token.push(TOKEN_ALPHABET[usize::from(byte % 62)] as char);
        }
    }

    Ok(token)
}

/// Generate a random token that differs from `previous`.
fn generate_replacement(previous: &str) -> Result<String> {
    loop {
        let token = generate_token(UPLOAD_TOKEN_LENGTH)?;
        if token != previous {
            return Ok(token);
        }
    }
}

/// Derive a token of exactly `length` characters from an optional seed.
///
/// The seed is trimmed first. An empty seed yields a fully random token, a
/// long seed is truncated and a short one is padded with random characters.
pub fn normalize_token(seed: Option<&str>, length: usize) -> Result<String> {
    let seed = seed.map(str::trim).unwrap_or_default();
    if seed.is_empty() {
        return generate_token(length);
    }

    if let Some(c) = seed
        .chars()
        .find(|c| !c.is_ascii_graphic() || FORBIDDEN_SEED_CHARS.contains(c))
    {
        return Err(FileAccessError::Token(format!(
            "token seed contains unsupported character {c:?}"
        )));
    }

    // Seed is ASCII, so byte and char positions agree
    if seed.len() >= length {
        return Ok(seed[..length].to_string());
    }

    let mut token = seed.to_string();
    token.push_str(&generate_token(length - seed.len())?);
    Ok(token)
}

/// Compare two strings without leaking where they differ.
///
/// Both sides are hashed first so the comparison always covers the same
/// number of bytes regardless of input length.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let a = Sha256::digest(a.as_bytes());
    let b = Sha256::digest(b.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Holder of the live upload and super tokens.
pub struct TokenAuthority {
    upload: Arc<Mutex<String>>,
    super_token: String,
}

impl fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("upload", &"<redacted>")
            .field("super_token", &"<redacted>")
            .finish()
    }
}

impl TokenAuthority {
    /// Derive both tokens from optional seeds and announce them.
    pub fn initialize(upload_seed: Option<&str>, super_seed: Option<&str>) -> Result<Self> {
        let upload = normalize_token(upload_seed, UPLOAD_TOKEN_LENGTH)?;
        let super_token = normalize_token(super_seed, SUPER_TOKEN_LENGTH)?;

        info!("Upload token: {}", upload);
        info!("Super token: {}", super_token);

        Ok(Self {
            upload: Arc::new(Mutex::new(upload)),
            super_token,
        })
    }

    /// The live upload token.
    pub async fn current_upload_token(&self) -> String {
        self.upload.lock().await.clone()
    }

    /// The super token.
    pub fn current_super_token(&self) -> &str {
        &self.super_token
    }

    /// Whether `presented` matches either live token.
    pub async fn validate(&self, presented: &str) -> bool {
        let upload = self.upload.lock().await;
        let is_upload = constant_time_eq(presented, &upload);
        let is_super = constant_time_eq(presented, &self.super_token);
        is_upload | is_super
    }

    /// Rotate the upload token if `used` is the live one.
    ///
    /// Returns the new token, or `None` when `used` was the super token or
    /// a token that is no longer live.
    pub async fn rotate_after_use(&self, used: &str) -> Result<Option<String>> {
        let mut upload = self.upload.lock().await;
        if !constant_time_eq(used, &upload) {
            return Ok(None);
        }

        let next = generate_replacement(&upload)?;
        *upload = next.clone();
        info!("Upload token rotated: {}", next);
        Ok(Some(next))
    }

    /// Authorize one upload.
    ///
    /// For the upload token the returned permit holds the token lock until
    /// it is completed or dropped, so a second upload presenting the same
    /// token waits and then fails validation. The replacement token is
    /// generated up front so that a completed upload always rotates.
    ///
    /// While an upload-token permit is held, every other request that is
    /// not using the super token waits for it, wrong tokens included. A
    /// rejected request therefore gets its 401 only after the in-flight
    /// upload body has been written or abandoned.
    pub async fn begin_upload(&self, presented: &str) -> Result<UploadPermit> {
        if constant_time_eq(presented, &self.super_token) {
            return Ok(UploadPermit {
                kind: PermitKind::Super,
            });
        }

        let guard = self.upload.clone().lock_owned().await;
        if !constant_time_eq(presented, &guard) {
            return Err(FileAccessError::Unauthorized);
        }

        let next = generate_replacement(&guard)?;
        Ok(UploadPermit {
            kind: PermitKind::Upload { guard, next },
        })
    }
}

/// Authorization for a single upload.
///
/// Dropping the permit without calling [`UploadPermit::complete`] leaves the
/// upload token unchanged.
#[must_use]
pub struct UploadPermit {
    kind: PermitKind,
}

enum PermitKind {
    Upload {
        guard: OwnedMutexGuard<String>,
        next: String,
    },
    Super,
}

impl fmt::Debug for UploadPermit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadPermit")
            .field("is_super", &self.is_super())
            .finish()
    }
}

impl UploadPermit {
    /// Whether the permit was granted by the super token.
    pub fn is_super(&self) -> bool {
        matches!(self.kind, PermitKind::Super)
    }

    /// Finish the upload, rotating the upload token if it was used.
    ///
    /// Returns the new upload token, if any.
    pub fn complete(self) -> Option<String> {
        match self.kind {
            PermitKind::Upload { mut guard, next } => {
                *guard = next.clone();
                info!("Upload token rotated: {}", next);
                Some(next)
            }
            PermitKind::Super => None,
        }
    }
}
