//! Authorization module.
//!
//! This module provides the upload and super tokens that gate write access.

mod token;

pub use token::{
    generate_token, normalize_token, TokenAuthority, UploadPermit, SUPER_TOKEN_LENGTH,
    UPLOAD_TOKEN_LENGTH,
};
