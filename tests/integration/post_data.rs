//! POST body tests: urlencoded, multipart, raw preview, limits.

use crate::helpers::*;
use env_dump::request::BodyLimits;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;

/// Test urlencoded form fields are decoded and sorted
#[tokio::test]
async fn test_post_urlencoded() {
    let server = TestServer::start().await;
    let resp = server
        .post_form(
            "/",
            &[("username", "testuser"), ("email", "test@example.com"), ("message", "a & b")],
        )
        .await;

    assert_status(&resp, StatusCode::OK);
    let body = resp.text().await.unwrap();

    let email = body.find(&row("email", "test@example.com")).expect("email row");
    let message = body.find(&row("message", "a &amp; b")).expect("message row");
    let username = body.find(&row("username", "testuser")).expect("username row");
    assert!(email < message && message < username);

    assert_contains_all(
        &body,
        &[
            "Request Method: POST",
            &row("CONTENT_TYPE", "application/x-www-form-urlencoded"),
            "Raw POST Data",
            "username=testuser&amp;email=test%40example.com&amp;message=a+%26+b",
        ],
    );
    assert!(!body.contains("Not a POST request"));
}

/// Test multipart text and file parts
#[tokio::test]
async fn test_post_multipart_with_file() {
    let server = TestServer::start().await;
    let form = Form::new().text("title", "<hello>").part(
        "upload",
        Part::bytes(b"file contents stay hidden".to_vec()).file_name("report.txt"),
    );

    let resp = server.post_multipart("/upload", form).await;

    assert_status(&resp, StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert_contains_all(
        &body,
        &[
            &row("title", "&lt;hello&gt;"),
            &row("upload", "📁 File: report.txt"),
            "Raw POST Data",
        ],
    );
}

/// Test malformed multipart reports a parse error instead of failing
#[tokio::test]
async fn test_post_multipart_without_boundary() {
    let server = TestServer::start().await;
    let resp = server
        .post_raw("/", "multipart/form-data", b"--x\r\n\r\n".to_vec())
        .await;

    assert_status(&resp, StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert_contains_all(
        &body,
        &["Error parsing: Missing boundary in multipart content-type"],
    );
}

/// Test non-form content types show only the raw preview
#[tokio::test]
async fn test_post_json_raw_only() {
    let server = TestServer::start().await;
    let resp = server
        .post_raw("/", "application/json", br#"{"key":"<v>"}"#.to_vec())
        .await;

    let body = resp.text().await.unwrap();
    assert_contains_all(
        &body,
        &[
            "<em>No POST data</em>",
            "{&quot;key&quot;:&quot;&lt;v&gt;&quot;}",
        ],
    );
}

/// Test empty POST body
#[tokio::test]
async fn test_post_empty() {
    let server = TestServer::start().await;
    let resp = server
        .post_raw("/", "application/x-www-form-urlencoded", Vec::new())
        .await;

    let body = resp.text().await.unwrap();
    assert_contains_all(&body, &["<em>No POST data</em>"]);
    assert!(!body.contains("Raw POST Data"));
}

/// Test raw preview truncation between 1000 and 10000 bytes
#[tokio::test]
async fn test_raw_preview_truncated() {
    let server = TestServer::start().await;
    let payload = format!("data={}", "x".repeat(4_995));
    let resp = server
        .post_raw("/", "application/x-www-form-urlencoded", payload.into_bytes())
        .await;

    let body = resp.text().await.unwrap();
    let preview = format!("    data={}\n    ... (truncated, 5000 bytes total)", "x".repeat(995));
    assert_contains_all(&body, &[&preview]);
}

/// Test raw preview is omitted for large bodies
#[tokio::test]
async fn test_raw_preview_omitted_for_large_body() {
    let server = TestServer::start().await;
    let payload = format!("data={}", "y".repeat(20_000));
    let resp = server
        .post_raw("/", "application/x-www-form-urlencoded", payload.into_bytes())
        .await;

    let body = resp.text().await.unwrap();
    assert!(body.contains("<tr><td class='key'>data</td><td>yyyy"));
    assert!(!body.contains("Raw POST Data"));
}

/// Test the body cap bounds what is decoded
#[tokio::test]
async fn test_body_cap() {
    let server = TestServer::start_with(BodyLimits { max_body_size: 8 }).await;
    let resp = server
        .post_raw("/", "application/x-www-form-urlencoded", b"a=1234567890&b=2".to_vec())
        .await;

    assert_status(&resp, StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert_contains_all(&body, &[&row("a", "123456")]);
    assert!(!body.contains(&row("b", "2")));
}
