//! Web module.
//!
//! This module provides the HTTP interface: an HTML directory browser, a
//! JSON listing API, streaming downloads and token-gated uploads.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod html;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
