//! File Access Service
//!
//! A small HTTP file server confined to a single storage root, with
//! directory browsing, streaming downloads and uploads gated by a rotating
//! token.

pub mod auth;
pub mod config;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use auth::{TokenAuthority, UploadPermit};
pub use config::Config;
pub use error::{FileAccessError, Result};
pub use file::{FileCatalog, FileEntry, Listing, PathResolver, ResolvedPath};
pub use web::WebServer;
