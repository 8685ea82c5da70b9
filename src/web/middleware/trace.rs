//! Request tracing with credential redaction.

use std::borrow::Cow;

use axum::{body::Body, http::Request};
use tracing::Span;

/// Path prefix of upload routes; the segment after it is a token.
const UPLOAD_PREFIX: &str = "/upload/";

/// Replace the token segment of an upload path.
pub fn redact_upload_token(path: &str) -> Cow<'_, str> {
    match path.strip_prefix(UPLOAD_PREFIX) {
        Some(rest) => {
            let tail = rest.find('/').map_or("", |i| &rest[i..]);
            Cow::Owned(format!("{UPLOAD_PREFIX}<redacted>{tail}"))
        }
        None => Cow::Borrowed(path),
    }
}

/// Build the span for one HTTP request.
///
/// Query strings are left out; only the method and redacted path are
/// recorded.
pub fn make_request_span(req: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %req.method(),
        path = %redact_upload_token(req.uri().path()),
    )
}
