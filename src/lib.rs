//! env_dump - diagnostic CGI request inspector.
//!
//! Renders a single HTML page describing the request it received: the
//! standard CGI meta-variables, decoded query parameters, the decoded POST
//! body with a raw preview, the complete environment, and runtime details.
//! Every value is HTML-escaped before it reaches the page.
//!
//! The same report pipeline runs behind two hosts:
//!
//! - [`cgi`] - one request per process, driven by a web server through the
//!   CGI/1.1 environment and stdin
//! - [`server`] - a standalone HTTP/1.1 and HTTP/2 server that synthesizes
//!   the CGI environment for every request
//!
//! # Example
//!
//! ```rust,ignore
//! use env_dump::core::RequestSnapshot;
//! use env_dump::report::{assemble, render_html};
//! use env_dump::request::BodyLimits;
//!
//! let snapshot = RequestSnapshot::builder("GET")
//!     .query_string("b=2&a=1")
//!     .build();
//! let report = assemble(&snapshot, BodyLimits::default()).await;
//! let html = render_html(&report);
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars) with optional "-dirty" suffix
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)" or "0.1.0 (abc12345-dirty)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod cgi;
pub mod config;
pub mod core;
pub mod logging;
pub mod report;
pub mod request;
pub mod server;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use server::Server;
