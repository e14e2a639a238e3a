//! Test helpers and utilities

use std::io::Write;
use std::net::SocketAddr;
use std::process::{Command, Stdio};
use std::time::Duration;

use env_dump::config::ServerConfig;
use env_dump::request::BodyLimits;
use env_dump::Server;
use reqwest::{Client, Response, StatusCode};

/// In-process inspector server bound to an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
}

#[allow(dead_code)]
impl TestServer {
    /// Start a server with default config and limits.
    pub async fn start() -> Self {
        Self::start_with(BodyLimits::default()).await
    }

    /// Start a server with custom body limits.
    pub async fn start_with(limits: BodyLimits) -> Self {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        Self::start_with_config(ServerConfig::new(addr), limits).await
    }

    /// Start a server with a custom config (the listen port should be 0).
    pub async fn start_with_config(config: ServerConfig, limits: BodyLimits) -> Self {
        let server = Server::bind(config, limits)
            .await
            .expect("Failed to bind test server");
        let base_url = format!("http://{}", server.local_addr());

        tokio::spawn(async move {
            let _ = server.run().await;
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { base_url, client }
    }

    /// Make a GET request to the server
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// Make a GET request with custom headers
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> Response {
        let mut req = self.client.get(format!("{}{}", self.base_url, path));
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        req.send().await.expect("GET request failed")
    }

    /// Make a POST request with form data
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Make a POST request with a raw body and content type
    pub async fn post_raw(&self, path: &str, content_type: &str, body: Vec<u8>) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header("content-type", content_type)
            .body(body)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Make a POST request with a multipart form
    pub async fn post_multipart(&self, path: &str, form: reqwest::multipart::Form) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .multipart(form)
            .send()
            .await
            .expect("POST request failed")
    }
}

/// Output of one CGI invocation of the binary.
pub struct CgiOutput {
    pub headers: String,
    pub body: String,
}

/// Run the binary as a CGI program with exactly `env` and `stdin`.
pub fn run_cgi(env: &[(&str, &str)], stdin: &[u8]) -> CgiOutput {
    let mut child = Command::new(env!("CARGO_BIN_EXE_env_dump"))
        .env_clear()
        .env("GATEWAY_INTERFACE", "CGI/1.1")
        .envs(env.iter().copied())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn env_dump");

    // The gateway may exit without draining stdin; a broken pipe is expected then
    let _ = child
        .stdin
        .take()
        .expect("stdin not piped")
        .write_all(stdin);

    let output = child.wait_with_output().expect("Failed to wait for env_dump");
    assert!(output.status.success(), "env_dump exited with {}", output.status);

    let stdout = String::from_utf8(output.stdout).expect("stdout is not UTF-8");
    let (headers, body) = stdout
        .split_once("\r\n\r\n")
        .expect("Missing header terminator");

    CgiOutput {
        headers: headers.to_string(),
        body: body.to_string(),
    }
}

/// Table row as rendered for a key/value pair.
pub fn row(key: &str, value: &str) -> String {
    format!("<tr><td class='key'>{}</td><td>{}</td></tr>", key, value)
}

/// Assert that response has expected status
pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}

/// Assert that response contains header
pub fn assert_header(response: &Response, name: &str, expected: &str) {
    let value = response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("Header '{}' not found", name))
        .to_str()
        .unwrap();
    assert_eq!(value, expected, "Header '{}' mismatch", name);
}

/// Assert that response has header present
pub fn assert_has_header(response: &Response, name: &str) {
    assert!(
        response.headers().contains_key(name),
        "Header '{}' not found",
        name
    );
}

/// Assert that a body contains every substring
pub fn assert_contains_all(body: &str, substrings: &[&str]) {
    for substring in substrings {
        assert!(
            body.contains(substring),
            "Body does not contain '{}'. Body: {}",
            substring,
            body.chars().take(500).collect::<String>()
        );
    }
}
