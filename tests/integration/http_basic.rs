//! Basic HTTP tests: page layout, query parameters, escaping, headers.

use crate::helpers::*;
use env_dump::config::ServerConfig;
use env_dump::request::BodyLimits;
use reqwest::StatusCode;

/// Test GET request renders the full page
#[tokio::test]
async fn test_get_renders_report() {
    let server = TestServer::start().await;
    let resp = server.get("/cgi-bin/env").await;

    assert_status(&resp, StatusCode::OK);
    assert_header(&resp, "content-type", "text/html; charset=utf-8");

    let body = resp.text().await.unwrap();
    assert!(body.starts_with("<!DOCTYPE html>"));
    assert_contains_all(
        &body,
        &[
            "Request Method: GET",
            "📋 CGI Environment Variables",
            &row("GATEWAY_INTERFACE", "CGI/1.1"),
            &row("REQUEST_METHOD", "GET"),
            &row("SCRIPT_NAME", "/cgi-bin/env"),
            &row("QUERY_STRING", ""),
            &row("PATH_INFO", "<em>(not set)</em>"),
            "<em>No query parameters</em>",
            "⚠️ Not a POST request",
            "🔧 All Environment Variables",
            "ℹ️ Runtime Info",
        ],
    );
}

/// Test query parameters are decoded, sorted and joined
#[tokio::test]
async fn test_query_params_sorted() {
    let server = TestServer::start().await;
    let resp = server.get("/?name=Alice&age=30&tag=a&tag=b&empty=").await;

    assert_status(&resp, StatusCode::OK);
    let body = resp.text().await.unwrap();

    let age = body.find(&row("age", "30")).expect("age row");
    let empty = body.find(&row("empty", "")).expect("empty row");
    let name = body.find(&row("name", "Alice")).expect("name row");
    let tag = body.find(&row("tag", "a, b")).expect("tag row");
    assert!(age < empty && empty < name && name < tag);
}

/// Test query values are escaped, never echoed raw
#[tokio::test]
async fn test_query_params_escaped() {
    let server = TestServer::start().await;
    let resp = server
        .get("/?q=%3Cscript%3Ealert(%22x%22)%3C%2Fscript%3E&amp=a%26b")
        .await;

    let body = resp.text().await.unwrap();
    assert!(!body.contains("<script>"));
    assert_contains_all(
        &body,
        &[
            &row("q", "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"),
            &row("amp", "a&amp;b"),
        ],
    );
}

/// Test request headers appear as HTTP_* variables
#[tokio::test]
async fn test_headers_become_cgi_vars() {
    let server = TestServer::start().await;
    let resp = server
        .get_with_headers("/", &[("user-agent", "probe/<1.0>"), ("x-custom", "hello")])
        .await;

    let body = resp.text().await.unwrap();
    assert_contains_all(
        &body,
        &[
            &row("HTTP_USER_AGENT", "probe/&lt;1.0&gt;"),
            &row("HTTP_X_CUSTOM", "hello"),
            &row("REMOTE_ADDR", "127.0.0.1"),
        ],
    );
}

/// Test request ID is generated when absent
#[tokio::test]
async fn test_request_id_generated() {
    let server = TestServer::start().await;
    let resp = server.get("/").await;

    assert_has_header(&resp, "x-request-id");
    let id = resp.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(id.len(), 32);
}

/// Test client request ID is echoed back
#[tokio::test]
async fn test_request_id_echoed() {
    let server = TestServer::start().await;
    let resp = server
        .get_with_headers("/", &[("x-request-id", "trace-abc-123")])
        .await;

    assert_header(&resp, "x-request-id", "trace-abc-123");
}

/// Test any method is answered with a report
#[tokio::test]
async fn test_put_is_not_post() {
    let server = TestServer::start().await;
    let resp = server
        .client
        .put(format!("{}/", server.base_url))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("a=1")
        .send()
        .await
        .unwrap();

    assert_status(&resp, StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert_contains_all(&body, &["Request Method: PUT", "⚠️ Not a POST request"]);
    assert!(!body.contains("Raw POST Data"));
}

/// Test the server's own environment stays hidden unless enabled
#[tokio::test]
async fn test_process_env_hidden_by_default() {
    let server = TestServer::start().await;
    let body = server.get("/").await.text().await.unwrap();
    assert!(!body.contains("<td class='key'>PATH</td>"));
    assert_contains_all(&body, &[&row("REQUEST_METHOD", "GET")]);

    let config = ServerConfig::new("127.0.0.1:0".parse().unwrap()).with_process_env(true);
    let server = TestServer::start_with_config(config, BodyLimits::default()).await;
    let body = server.get("/").await.text().await.unwrap();
    assert!(body.contains("<td class='key'>PATH</td>"));
}
