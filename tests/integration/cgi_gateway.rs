//! CGI gateway tests: the binary driven through environment and stdin.

use crate::helpers::*;

/// Test CGI response header block
#[test]
fn test_cgi_headers() {
    let out = run_cgi(&[("REQUEST_METHOD", "GET")], b"");

    assert_eq!(
        out.headers,
        "Content-Type: text/html; charset=utf-8\r\nStatus: 200 OK"
    );
    assert!(out.body.starts_with("<!DOCTYPE html>"));
}

/// Test GET with query string and allow-listed variables
#[test]
fn test_cgi_get() {
    let out = run_cgi(
        &[
            ("REQUEST_METHOD", "GET"),
            ("QUERY_STRING", "b=2&a=1&a=3"),
            ("SERVER_SOFTWARE", "nginx/1.25"),
            ("SCRIPT_NAME", "/cgi-bin/env_dump"),
        ],
        b"",
    );

    assert_contains_all(
        &out.body,
        &[
            "Request Method: GET",
            &row("SERVER_SOFTWARE", "nginx/1.25"),
            &row("SCRIPT_NAME", "/cgi-bin/env_dump"),
            &row("REDIRECT_STATUS", "<em>(not set)</em>"),
            "⚠️ Not a POST request",
        ],
    );

    let a = out.body.find(&row("a", "1, 3")).expect("a row");
    let b = out.body.find(&row("b", "2")).expect("b row");
    assert!(a < b);
}

/// Test POST body is read from stdin up to CONTENT_LENGTH
#[test]
fn test_cgi_post_reads_declared_length() {
    let out = run_cgi(
        &[
            ("REQUEST_METHOD", "POST"),
            ("CONTENT_TYPE", "application/x-www-form-urlencoded"),
            ("CONTENT_LENGTH", "22"),
        ],
        b"name=Alice&age=30&x=%3 and stdin keeps going",
    );

    assert_contains_all(
        &out.body,
        &[
            &row("age", "30"),
            &row("name", "Alice"),
            &row("x", "%3"),
            "name=Alice&amp;age=30&amp;x=%3",
        ],
    );
    assert!(!out.body.contains("stdin keeps going"));
}

/// Test POST without CONTENT_LENGTH reads nothing
#[test]
fn test_cgi_post_without_length() {
    let out = run_cgi(
        &[
            ("REQUEST_METHOD", "POST"),
            ("CONTENT_TYPE", "application/x-www-form-urlencoded"),
        ],
        b"ignored=1",
    );

    assert_contains_all(&out.body, &["<em>No POST data</em>"]);
    assert!(!out.body.contains("ignored"));
}

/// Test missing REQUEST_METHOD falls back to UNKNOWN
#[test]
fn test_cgi_unknown_method() {
    let out = run_cgi(&[], b"");

    assert_contains_all(
        &out.body,
        &[
            "Request Method: UNKNOWN",
            &row("REQUEST_METHOD", "<em>(not set)</em>"),
            "⚠️ Not a POST request",
        ],
    );
}

/// Test environment values are escaped in the full listing
#[test]
fn test_cgi_environment_escaped() {
    let out = run_cgi(
        &[("REQUEST_METHOD", "GET"), ("APP_BANNER", "<b>\"hi\" & 'bye'</b>")],
        b"",
    );

    assert_contains_all(
        &out.body,
        &[&row(
            "APP_BANNER",
            "&lt;b&gt;&quot;hi&quot; &amp; &#x27;bye&#x27;&lt;/b&gt;",
        )],
    );
    assert!(!out.body.contains("<b>\"hi\""));
}
