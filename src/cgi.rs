//! CGI gateway: one request from the process environment and stdin.

use std::collections::HashMap;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::config::Config;
use crate::core::{RequestSnapshot, Result, RuntimeInfo};
use crate::report::{assemble, render_html};
use crate::request::{is_body_method, parse_declared_length, BodyLimits};

/// Response header block written before the document.
pub const CGI_HEADERS: &str = "Content-Type: text/html; charset=utf-8\r\nStatus: 200 OK\r\n\r\n";

/// Read at most the declared number of body bytes.
///
/// Nothing is read for non-POST requests or when the declared length is
/// missing, zero, negative or non-numeric. A short stream yields what was
/// available.
pub async fn read_body<R>(
    reader: R,
    method: &str,
    declared_length: Option<&str>,
    limits: BodyLimits,
) -> std::io::Result<Bytes>
where
    R: AsyncRead + Unpin,
{
    if !is_body_method(method) {
        return Ok(Bytes::new());
    }
    let Some(length) = parse_declared_length(declared_length, limits.max_body_size) else {
        return Ok(Bytes::new());
    };

    // Grow as data arrives instead of trusting the declared length up front
    let mut buf = Vec::with_capacity(length.min(64 * 1024) as usize);
    reader.take(length).read_to_end(&mut buf).await?;

    if (buf.len() as u64) < length {
        debug!(
            declared = length,
            read = buf.len(),
            "stdin ended before declared length"
        );
    }

    Ok(Bytes::from(buf))
}

/// Handle one CGI request: build the snapshot, render, write the response.
pub async fn handle<R, W>(
    env: HashMap<String, String>,
    stdin: R,
    mut stdout: W,
    runtime: RuntimeInfo,
    limits: BodyLimits,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let method = env.get("REQUEST_METHOD").map(String::as_str).unwrap_or("");
    let declared = env.get("CONTENT_LENGTH").map(String::as_str);

    let body = match read_body(stdin, method, declared, limits).await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "failed to read request body, continuing without it");
            Bytes::new()
        }
    };

    let snapshot = RequestSnapshot::from_cgi_env(env, body, runtime);
    let report = assemble(&snapshot, limits).await;
    let html = render_html(&report);

    stdout.write_all(CGI_HEADERS.as_bytes()).await?;
    stdout.write_all(html.as_bytes()).await?;
    stdout.flush().await?;

    debug!(
        method = snapshot.method(),
        bytes = html.len(),
        "CGI response written"
    );

    Ok(())
}

/// Run in CGI mode against the real process environment and stdio.
pub async fn run(config: &Config) -> Result<()> {
    // Non-UTF-8 variables cannot be displayed faithfully; convert them lossily
    let env: HashMap<String, String> = std::env::vars_os()
        .map(|(k, v)| {
            (
                k.to_string_lossy().into_owned(),
                v.to_string_lossy().into_owned(),
            )
        })
        .collect();

    handle(
        env,
        tokio::io::stdin(),
        tokio::io::stdout(),
        RuntimeInfo::current(),
        config.limits,
    )
    .await
}
