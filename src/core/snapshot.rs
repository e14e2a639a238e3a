//! Immutable per-request snapshot passed through the report pipeline.

use std::collections::HashMap;

use bytes::Bytes;

/// Method reported when the gateway did not provide one.
pub const UNKNOWN_METHOD: &str = "UNKNOWN";

/// Runtime information shown at the bottom of the report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeInfo {
    /// Crate version with build hash.
    pub version: String,
    /// Target platform, e.g. `linux-x86_64 (unix)`.
    pub platform: String,
    /// Path of the running executable.
    pub executable: String,
}

impl RuntimeInfo {
    /// Capture information about the current process.
    pub fn current() -> Self {
        Self {
            version: version_string(),
            platform: format!(
                "{}-{} ({})",
                std::env::consts::OS,
                std::env::consts::ARCH,
                std::env::consts::FAMILY
            ),
            executable: std::env::current_exe()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Crate version, with the build hash when one was recorded.
fn version_string() -> String {
    if crate::BUILD_VERSION.is_empty() {
        crate::PKG_VERSION.to_string()
    } else {
        crate::VERSION.to_string()
    }
}

impl Default for RuntimeInfo {
    fn default() -> Self {
        Self {
            version: version_string(),
            platform: String::new(),
            executable: String::new(),
        }
    }
}

/// Everything the report needs about one request.
///
/// Built once by the host (CGI gateway or HTTP server) and never mutated.
/// Components read the environment from here, never from the process.
#[derive(Debug)]
pub struct RequestSnapshot {
    method: String,
    query_string: String,
    body: Bytes,
    content_type: Option<String>,
    content_length: Option<String>,
    env: HashMap<String, String>,
    runtime: RuntimeInfo,
}

impl RequestSnapshot {
    /// Create a snapshot builder.
    #[inline]
    pub fn builder(method: impl Into<String>) -> SnapshotBuilder {
        SnapshotBuilder::new(method)
    }

    /// Build a snapshot from a CGI environment.
    ///
    /// Request metadata comes from `REQUEST_METHOD`, `QUERY_STRING`,
    /// `CONTENT_TYPE` and `CONTENT_LENGTH`; the whole mapping is kept as the
    /// environment.
    pub fn from_cgi_env(env: HashMap<String, String>, body: Bytes, runtime: RuntimeInfo) -> Self {
        let method = env
            .get("REQUEST_METHOD")
            .filter(|m| !m.is_empty())
            .cloned()
            .unwrap_or_else(|| UNKNOWN_METHOD.to_string());
        let query_string = env.get("QUERY_STRING").cloned().unwrap_or_default();
        let content_type = env.get("CONTENT_TYPE").cloned();
        let content_length = env.get("CONTENT_LENGTH").cloned();

        Self {
            method,
            query_string,
            body,
            content_type,
            content_length,
            env,
            runtime,
        }
    }

    /// Request method as received.
    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Raw query string (without `?`), empty when absent.
    #[inline]
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Raw body bytes, possibly empty.
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Declared content type.
    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Declared content length, unparsed.
    #[inline]
    pub fn content_length(&self) -> Option<&str> {
        self.content_length.as_deref()
    }

    /// Look up one environment variable.
    #[inline]
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    /// The full environment mapping.
    #[inline]
    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// Runtime information.
    #[inline]
    pub fn runtime(&self) -> &RuntimeInfo {
        &self.runtime
    }
}

/// Builder for [`RequestSnapshot`].
pub struct SnapshotBuilder {
    method: String,
    query_string: String,
    body: Bytes,
    content_type: Option<String>,
    content_length: Option<String>,
    env: HashMap<String, String>,
    runtime: RuntimeInfo,
}

impl SnapshotBuilder {
    /// Create a new builder for a request with the given method.
    #[inline]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            query_string: String::new(),
            body: Bytes::new(),
            content_type: None,
            content_length: None,
            env: HashMap::new(),
            runtime: RuntimeInfo::default(),
        }
    }

    #[inline]
    pub fn query_string(mut self, query: impl Into<String>) -> Self {
        self.query_string = query.into();
        self
    }

    #[inline]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    #[inline]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[inline]
    pub fn content_length(mut self, content_length: impl Into<String>) -> Self {
        self.content_length = Some(content_length.into());
        self
    }

    /// Set a single environment variable (later values win).
    #[inline]
    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Merge a set of environment variables (later values win).
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    #[inline]
    pub fn runtime(mut self, runtime: RuntimeInfo) -> Self {
        self.runtime = runtime;
        self
    }

    /// Build the snapshot.
    pub fn build(self) -> RequestSnapshot {
        RequestSnapshot {
            method: self.method,
            query_string: self.query_string,
            body: self.body,
            content_type: self.content_type,
            content_length: self.content_length,
            env: self.env,
            runtime: self.runtime,
        }
    }
}
