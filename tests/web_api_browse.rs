//! Web API Browse/Download Tests
//!
//! Integration tests for the listing, download, favicon and health endpoints.

mod common;

use axum::http::{header, StatusCode};
use common::{TestApp, FAVICON_BYTES};
use serde_json::Value;

// ============================================================================
// HTML listing
// ============================================================================

#[tokio::test]
async fn test_browse_root_page() {
    let app = TestApp::new();
    app.create_dir("docs");
    app.write_file("readme.txt", b"hello");

    let response = app.server.get("/").await;

    response.assert_status_ok();
    let content_type = response.header(header::CONTENT_TYPE);
    assert!(content_type.to_str().unwrap().starts_with("text/html"));

    let page = response.text();
    assert!(page.contains("<a href=\"/?path=docs\">docs/</a>"));
    assert!(page.contains("<a href=\"/download/readme.txt\">readme.txt</a>"));
    assert!(page.contains("5 bytes"));
    assert!(page.contains("Upload with"));
}

#[tokio::test]
async fn test_browse_page_does_not_leak_tokens() {
    let app = TestApp::new();

    let page = app.server.get("/").await.text();

    assert!(!page.contains(&app.upload_token().await));
    assert!(!page.contains(&app.super_token()));
}

#[tokio::test]
async fn test_browse_subdirectory_page() {
    let app = TestApp::new();
    app.write_file("docs/2024/report.pdf", b"pdf");

    let response = app.server.get("/?path=docs%2F2024").await;

    response.assert_status_ok();
    let page = response.text();
    assert!(page.contains("/download/docs/2024/report.pdf"));
    assert!(page.contains("Up one level"));
    assert!(!page.contains("Upload with"));
}

#[tokio::test]
async fn test_browse_escapes_file_names() {
    let app = TestApp::new();
    app.write_file("<b>bold.txt", b"x");

    let page = app.server.get("/").await.text();

    assert!(!page.contains("<b>bold"));
    assert!(page.contains("&lt;b&gt;bold.txt"));
}

#[tokio::test]
async fn test_browse_empty_directory() {
    let app = TestApp::new();
    app.create_dir("empty");

    let response = app.server.get("/?path=empty").await;

    response.assert_status_ok();
    assert!(response.text().contains("Directory is empty."));
}

#[tokio::test]
async fn test_browse_missing_and_escaping_are_identical() {
    let app = TestApp::new();

    let missing = app.server.get("/?path=nope").await;
    let escaping = app.server.get("/?path=..%2Foutside").await;
    let file = {
        app.write_file("a.txt", b"a");
        app.server.get("/?path=a.txt").await
    };

    missing.assert_status(StatusCode::NOT_FOUND);
    escaping.assert_status(StatusCode::NOT_FOUND);
    file.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(missing.text(), escaping.text());
    assert_eq!(missing.text(), file.text());
}

// ============================================================================
// JSON listing
// ============================================================================

#[tokio::test]
async fn test_list_entries_json() {
    let app = TestApp::new();
    app.create_dir("docs/Beta");
    app.create_dir("docs/alpha");
    app.write_file("docs/b.txt", b"12");
    app.write_file("docs/A.txt", b"1");

    let response = app.server.get("/api/entries?path=docs").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["path"], "docs");

    let entries = body["data"]["entries"].as_array().unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["alpha", "Beta", "A.txt", "b.txt"]);

    assert_eq!(entries[0]["kind"], "directory");
    assert_eq!(entries[0]["path"], "docs/alpha");
    assert!(entries[0].get("size").is_none());
    assert_eq!(entries[3]["kind"], "file");
    assert_eq!(entries[3]["size"], 2);
}

#[tokio::test]
async fn test_list_entries_root_default() {
    let app = TestApp::new();

    let response = app.server.get("/api/entries").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["path"], "");
    assert!(body["data"]["entries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_entries_error_shape() {
    let app = TestApp::new();

    let response = app.server.get("/api/entries?path=..%2F..%2Fetc").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["message"], "Not found");
}

// ============================================================================
// Download
// ============================================================================

#[tokio::test]
async fn test_download_file() {
    let app = TestApp::new();
    app.write_file("docs/notes.txt", b"hello world");

    let response = app.server.get("/download/docs/notes.txt").await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"hello world");
    assert_eq!(response.header(header::CONTENT_LENGTH), "11");
    assert!(response
        .header(header::CONTENT_TYPE)
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "attachment; filename=\"notes.txt\""
    );
}

#[tokio::test]
async fn test_download_binary_content_type() {
    let app = TestApp::new();
    app.write_file("blob.unknownext", &[0u8, 159, 146, 150]);

    let response = app.server.get("/download/blob.unknownext").await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), &[0u8, 159, 146, 150]);
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        "application/octet-stream"
    );
}

#[tokio::test]
async fn test_download_percent_encoded_name() {
    let app = TestApp::new();
    app.write_file("my docs/r\u{e9}sum\u{e9}.txt", b"cv");

    let response = app.server.get("/download/my%20docs/r%C3%A9sum%C3%A9.txt").await;

    response.assert_status_ok();
    assert_eq!(response.text(), "cv");
    let disposition = response.header(header::CONTENT_DISPOSITION);
    assert!(disposition
        .to_str()
        .unwrap()
        .contains("filename*=UTF-8''r%C3%A9sum%C3%A9.txt"));
}

#[tokio::test]
async fn test_download_missing_and_escaping_are_identical() {
    let app = TestApp::new();

    let missing = app.server.get("/download/docs/missing.txt").await;
    let escaping = app
        .server
        .get("/download/docs%2F..%2F..%2Foutside%2Fsecret.txt")
        .await;

    missing.assert_status(StatusCode::NOT_FOUND);
    escaping.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(missing.text(), escaping.text());
    assert!(!escaping.text().contains("secret"));
}

#[tokio::test]
async fn test_download_directory_is_not_found() {
    let app = TestApp::new();
    app.create_dir("docs");

    let response = app.server.get("/download/docs").await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_malformed_paths_match_missing() {
    let app = TestApp::new();

    let missing = app.server.get("/download/missing.txt").await;
    let bad_utf8 = app.server.get("/download/%FF").await;
    let empty = app.server.get("/download/").await;

    missing.assert_status(StatusCode::NOT_FOUND);
    bad_utf8.assert_status(StatusCode::NOT_FOUND);
    empty.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(missing.text(), bad_utf8.text());
    assert_eq!(missing.text(), empty.text());
}

#[tokio::test]
async fn test_list_entries_malformed_query_matches_missing() {
    let app = TestApp::new();

    let missing = app.server.get("/api/entries?path=nope").await;
    let bad_utf8 = app.server.get("/api/entries?path=%FF").await;

    missing.assert_status(StatusCode::NOT_FOUND);
    bad_utf8.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(missing.text(), bad_utf8.text());
}

#[tokio::test]
async fn test_download_temp_file_is_not_found() {
    let app = TestApp::new();
    app.write_file(".upload-1234.part", b"partial");

    let response = app.server.get("/download/.upload-1234.part").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(!response.text().contains("partial"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_download_symlink_escape_is_not_found() {
    let app = TestApp::new();
    std::os::unix::fs::symlink(&app.outside, app.root.join("link")).unwrap();

    let response = app.server.get("/download/link/secret.txt").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(!response.text().contains("top secret"));
}

// ============================================================================
// Ambient endpoints and headers
// ============================================================================

#[tokio::test]
async fn test_favicon() {
    let app = TestApp::new();

    let response = app.server.get("/favicon.ico").await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), FAVICON_BYTES);
}

#[tokio::test]
async fn test_favicon_missing_is_not_found() {
    let app = TestApp::without_favicon();

    let response = app.server.get("/favicon.ico").await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route_matches_missing_file() {
    let app = TestApp::new();

    let unknown = app.server.get("/no/such/route").await;
    let missing = app.server.get("/download/missing.txt").await;

    unknown.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(unknown.text(), missing.text());
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let app = TestApp::new();
    app.write_file("a.txt", b"a");

    for path in ["/", "/api/entries", "/download/a.txt", "/download/missing", "/health"] {
        let response = app.server.get(path).await;
        assert_eq!(
            response.header(header::CONTENT_SECURITY_POLICY),
            "default-src 'self'; style-src 'self' 'unsafe-inline';",
            "missing CSP on {path}"
        );
        assert_eq!(response.header(header::X_CONTENT_TYPE_OPTIONS), "nosniff");
    }
}
