//! HTTP handlers.

pub mod browse;
pub mod download;
pub mod upload;

pub use browse::*;
pub use download::*;
pub use upload::*;

use std::sync::Arc;

use crate::auth::TokenAuthority;
use crate::file::FileCatalog;

/// Application state shared by all handlers.
#[derive(Debug)]
pub struct AppState {
    /// File operations confined to the storage root.
    pub catalog: FileCatalog,
    /// Upload and super tokens.
    pub tokens: Arc<TokenAuthority>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(catalog: FileCatalog, tokens: Arc<TokenAuthority>) -> Self {
        Self { catalog, tokens }
    }
}
