//! Integration tests for env_dump
//!
//! The HTTP tests start the inspector server in-process on an ephemeral
//! port. The CGI tests run the compiled binary the way a web server would:
//! environment variables in, request body on stdin, response on stdout.
//!
//! Run with: cargo test --test integration

mod helpers;

mod cgi_gateway;
mod http_basic;
mod post_data;
