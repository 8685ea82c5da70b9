//! Middleware for the HTTP layer.

pub mod security;
pub mod trace;

pub use security::{security_headers, CONTENT_SECURITY_POLICY};
pub use trace::{make_request_span, redact_upload_token};
