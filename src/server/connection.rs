//! Per-connection request handling for the standalone server.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::{Bytes, BytesMut};
use http::header::{self, HeaderName, HeaderValue};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming as IncomingBody;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::core::{RequestSnapshot, RuntimeInfo};
use crate::logging::{log_access, AccessEntry};
use crate::report::{assemble, render_html};
use crate::request::{is_body_method, parse_declared_length, BodyLimits};

static X_REQUEST_ID: std::sync::LazyLock<HeaderName> =
    std::sync::LazyLock::new(|| HeaderName::from_static("x-request-id"));

mod header_values {
    use super::HeaderValue;

    pub static TEXT_HTML_UTF8: HeaderValue = HeaderValue::from_static("text/html; charset=utf-8");
    pub static NO_STORE: HeaderValue = HeaderValue::from_static("no-store");
}

mod http_versions {
    pub const HTTP_10: &str = "HTTP/1.0";
    pub const HTTP_11: &str = "HTTP/1.1";
    pub const HTTP_20: &str = "HTTP/2.0";
    pub const HTTP_30: &str = "HTTP/3.0";

    /// Convert http::Version to static string.
    #[inline]
    pub fn from_http(version: http::Version) -> &'static str {
        match version {
            http::Version::HTTP_10 => HTTP_10,
            http::Version::HTTP_11 => HTTP_11,
            http::Version::HTTP_2 => HTTP_20,
            http::Version::HTTP_3 => HTTP_30,
            _ => HTTP_11,
        }
    }
}

/// Check if an error is a common connection reset or timeout.
#[inline]
fn is_connection_error(err_str: &str) -> bool {
    err_str.contains("connection reset")
        || err_str.contains("broken pipe")
        || err_str.contains("Connection reset")
        || err_str.contains("os error 104")
        || err_str.contains("os error 32")
        || err_str.contains("timed out")
        || err_str.contains("HeaderTimeout")
}

/// State shared by all connections of one server.
pub struct ConnectionContext {
    pub limits: BodyLimits,
    pub runtime: RuntimeInfo,
    /// Process environment captured at startup (empty when hidden).
    pub base_env: Vec<(String, String)>,
    pub local_addr: SocketAddr,
    pub header_timeout: std::time::Duration,
    pub access_log_enabled: bool,
    pub service_name: String,
}

impl ConnectionContext {
    /// Serve one TCP connection (HTTP/1.1 or HTTP/2).
    pub async fn handle_connection(self: Arc<Self>, stream: TcpStream, remote_addr: SocketAddr) {
        let ctx = Arc::clone(&self);
        let service = service_fn(move |req| {
            let ctx = Arc::clone(&ctx);
            async move { ctx.handle_request(req, remote_addr).await }
        });

        let io = TokioIo::new(stream);
        if let Err(err) = auto::Builder::new(TokioExecutor::new())
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(Some(self.header_timeout))
            .keep_alive(true)
            .http2()
            .max_concurrent_streams(250)
            .serve_connection(io, service)
            .await
        {
            let err_str = format!("{:?}", err);
            if !is_connection_error(&err_str) {
                debug!("Connection error: {:?}", err);
            }
        }
    }

    async fn handle_request(
        &self,
        req: Request<IncomingBody>,
        remote_addr: SocketAddr,
    ) -> Result<Response<Full<Bytes>>, Infallible> {
        let started = Instant::now();
        let (parts, body) = req.into_parts();

        let request_id = parts
            .headers
            .get(&*X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());

        let method = parts.method.as_str();
        let declared = header_str(&parts.headers, &header::CONTENT_LENGTH);
        let body = read_limited_body(body, method, declared.as_deref(), self.limits).await;

        let snapshot = self.build_snapshot(&parts, remote_addr, body);
        let report = assemble(&snapshot, self.limits).await;
        let html = render_html(&report);
        let bytes = html.len() as u64;

        let mut response = Response::new(Full::new(Bytes::from(html)));
        *response.status_mut() = StatusCode::OK;
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, header_values::TEXT_HTML_UTF8.clone());
        headers.insert(header::CACHE_CONTROL, header_values::NO_STORE.clone());
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            headers.insert(X_REQUEST_ID.clone(), value);
        }

        if self.access_log_enabled {
            let ip = remote_addr.ip().to_string();
            let ua = header_str(&parts.headers, &header::USER_AGENT);
            log_access(
                &AccessEntry {
                    request_id: &request_id,
                    ip: &ip,
                    method,
                    path: parts.uri.path(),
                    query: parts.uri.query(),
                    http: http_versions::from_http(parts.version),
                    status: StatusCode::OK.as_u16(),
                    bytes,
                    duration_ms: started.elapsed().as_secs_f64() * 1000.0,
                    ua: ua.as_deref(),
                },
                &self.service_name,
            );
        }

        Ok(response)
    }

    /// Build the snapshot: process environment overlaid with CGI variables.
    fn build_snapshot(
        &self,
        parts: &http::request::Parts,
        remote_addr: SocketAddr,
        body: Bytes,
    ) -> RequestSnapshot {
        let mut builder = RequestSnapshot::builder(parts.method.as_str())
            .query_string(parts.uri.query().unwrap_or(""))
            .body(body)
            .runtime(self.runtime.clone())
            .envs(self.base_env.iter().cloned())
            .envs(cgi_environment(parts, remote_addr, self.local_addr));

        if let Some(ct) = header_str(&parts.headers, &header::CONTENT_TYPE) {
            builder = builder.content_type(ct);
        }
        if let Some(cl) = header_str(&parts.headers, &header::CONTENT_LENGTH) {
            builder = builder.content_length(cl);
        }

        builder.build()
    }
}

/// Header value as a lossy string.
fn header_str(headers: &http::HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}

/// Read at most `min(Content-Length, max_body_size)` bytes of the body.
///
/// Reading stops as soon as the bound is reached. A stream error keeps the
/// bytes received so far.
async fn read_limited_body<B>(
    mut body: B,
    method: &str,
    declared: Option<&str>,
    limits: BodyLimits,
) -> Bytes
where
    B: hyper::body::Body<Data = Bytes> + Unpin,
    B::Error: std::fmt::Display,
{
    if !is_body_method(method) {
        return Bytes::new();
    }
    let Some(limit) = parse_declared_length(declared, limits.max_body_size) else {
        return Bytes::new();
    };
    let limit = limit as usize;

    let mut buf = BytesMut::with_capacity(limit.min(64 * 1024));
    while buf.len() < limit {
        match body.frame().await {
            Some(Ok(frame)) => {
                if let Ok(data) = frame.into_data() {
                    let take = data.len().min(limit - buf.len());
                    buf.extend_from_slice(&data[..take]);
                }
            }
            Some(Err(e)) => {
                warn!(error = %e, read = buf.len(), "request body stream failed, using partial body");
                break;
            }
            None => break,
        }
    }

    buf.freeze()
}

/// Synthesize CGI meta-variables for a request.
pub fn cgi_environment(
    parts: &http::request::Parts,
    remote_addr: SocketAddr,
    local_addr: SocketAddr,
) -> Vec<(String, String)> {
    let mut vars: Vec<(String, String)> = Vec::with_capacity(16 + parts.headers.keys_len());

    let host = header_str(&parts.headers, &header::HOST)
        .or_else(|| parts.uri.authority().map(|a| a.to_string()));
    let (server_name, server_port) = split_host(host.as_deref(), local_addr);

    let mut push = |key: &str, value: String| vars.push((key.to_string(), value));

    push("GATEWAY_INTERFACE", "CGI/1.1".to_string());
    push(
        "SERVER_PROTOCOL",
        http_versions::from_http(parts.version).to_string(),
    );
    push("SERVER_SOFTWARE", format!("env_dump/{}", crate::PKG_VERSION));
    push("SERVER_NAME", server_name);
    push("SERVER_PORT", server_port);
    push("REQUEST_METHOD", parts.method.as_str().to_string());
    push(
        "REQUEST_URI",
        parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string()),
    );
    push("SCRIPT_NAME", parts.uri.path().to_string());
    push("QUERY_STRING", parts.uri.query().unwrap_or("").to_string());
    if let Some(ct) = header_str(&parts.headers, &header::CONTENT_TYPE) {
        push("CONTENT_TYPE", ct);
    }
    if let Some(cl) = header_str(&parts.headers, &header::CONTENT_LENGTH) {
        push("CONTENT_LENGTH", cl);
    }
    push("REMOTE_ADDR", remote_addr.ip().to_string());
    push("REMOTE_PORT", remote_addr.port().to_string());

    for name in parts.headers.keys() {
        if *name == header::CONTENT_TYPE || *name == header::CONTENT_LENGTH {
            continue;
        }
        let value = parts
            .headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        let key = format!(
            "HTTP_{}",
            name.as_str().to_ascii_uppercase().replace('-', "_")
        );
        push(&key, value);
    }

    vars
}

/// Split a Host header into server name and port.
fn split_host(host: Option<&str>, local_addr: SocketAddr) -> (String, String) {
    let default_port = local_addr.port().to_string();

    let Some(host) = host.filter(|h| !h.is_empty()) else {
        return (local_addr.ip().to_string(), default_port);
    };

    if host.starts_with('[') {
        // IPv6 literal, optionally followed by :port
        return match host.rfind("]:") {
            Some(pos) => (host[..pos + 1].to_string(), host[pos + 2..].to_string()),
            None => (host.to_string(), default_port),
        };
    }

    match host.rsplit_once(':') {
        Some((name, port)) => (name.to_string(), port.to_string()),
        None => (host.to_string(), default_port),
    }
}
