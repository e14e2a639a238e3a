//! Core types shared by the report pipeline and its hosts.
//!
//! - [`RequestSnapshot`] - immutable request context handed to the pipeline
//! - [`RuntimeInfo`] - process information shown in the report
//! - [`Error`] - host-level error type
//!
//! # Example
//!
//! ```rust,ignore
//! use env_dump::core::{RequestSnapshot, RuntimeInfo};
//!
//! let snapshot = RequestSnapshot::builder("GET")
//!     .query_string("name=Alice")
//!     .env_var("REQUEST_METHOD", "GET")
//!     .runtime(RuntimeInfo::current())
//!     .build();
//! ```

mod error;
mod snapshot;

pub use error::{Error, Result};
pub use snapshot::{RequestSnapshot, RuntimeInfo, SnapshotBuilder, UNKNOWN_METHOD};
