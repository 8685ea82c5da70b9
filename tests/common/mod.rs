//! Test helpers for HTTP integration tests.
//!
//! Provides a router backed by a temporary storage root and helpers for
//! seeding files.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum_test::TestServer;
use tempfile::TempDir;

use file_access::web::create_router;
use file_access::web::AppState;
use file_access::{FileCatalog, PathResolver, TokenAuthority};

/// Upload limit used by the test server (1 KiB).
pub const TEST_UPLOAD_LIMIT: u64 = 1024;

/// Favicon bytes written into the temporary static directory.
pub const FAVICON_BYTES: &[u8] = b"\x00\x00\x01\x00fake-icon";

/// A running test application.
pub struct TestApp {
    /// Keeps the temporary directory alive.
    _temp_dir: TempDir,
    /// Canonical storage root.
    pub root: PathBuf,
    /// Directory outside the storage root.
    pub outside: PathBuf,
    /// Token authority shared with the router.
    pub tokens: Arc<TokenAuthority>,
    /// In-process HTTP server.
    pub server: TestServer,
}

impl TestApp {
    /// Create a test application with random tokens.
    pub fn new() -> Self {
        Self::with_seeds(None, None)
    }

    /// Create a test application with the given token seeds.
    pub fn with_seeds(upload_seed: Option<&str>, super_seed: Option<&str>) -> Self {
        Self::build(upload_seed, super_seed, true)
    }

    /// Create a test application whose favicon file does not exist.
    pub fn without_favicon() -> Self {
        Self::build(None, None, false)
    }

    fn build(upload_seed: Option<&str>, super_seed: Option<&str>, with_favicon: bool) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let resolver =
            PathResolver::new(temp_dir.path().join("files")).expect("Failed to create root");
        let root = resolver.root().to_path_buf();

        let outside = temp_dir.path().join("outside");
        std::fs::create_dir_all(&outside).unwrap();
        std::fs::write(outside.join("secret.txt"), b"top secret").unwrap();

        let favicon = temp_dir.path().join("favicon.ico");
        if with_favicon {
            std::fs::write(&favicon, FAVICON_BYTES).unwrap();
        }

        let tokens = Arc::new(
            TokenAuthority::initialize(upload_seed, super_seed)
                .expect("Failed to initialize tokens"),
        );

        let catalog = FileCatalog::new(resolver, TEST_UPLOAD_LIMIT);
        let app_state = Arc::new(AppState::new(catalog, tokens.clone()));
        let router = create_router(app_state, &favicon);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            _temp_dir: temp_dir,
            root,
            outside,
            tokens,
            server,
        }
    }

    /// Write a file below the storage root, creating parents.
    pub fn write_file(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Create a directory below the storage root.
    pub fn create_dir(&self, relative: &str) -> PathBuf {
        let path = self.root.join(relative);
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    /// The live upload token.
    pub async fn upload_token(&self) -> String {
        self.tokens.current_upload_token().await
    }

    /// The super token.
    pub fn super_token(&self) -> String {
        self.tokens.current_super_token().to_string()
    }

    /// Whether any in-flight upload file is left below `dir`.
    pub fn has_partial_uploads(&self, dir: &Path) -> bool {
        std::fs::read_dir(dir)
            .map(|entries| {
                entries.flatten().any(|e| {
                    file_access::file::is_temp_file_name(&e.file_name().to_string_lossy())
                })
            })
            .unwrap_or(false)
    }
}
