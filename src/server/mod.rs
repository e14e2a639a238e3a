//! Standalone HTTP server that renders the inspection report per request.
//!
//! Each request is turned into the same [`RequestSnapshot`](crate::core::RequestSnapshot)
//! a CGI gateway would produce: CGI meta-variables are synthesized from the
//! request line, headers and peer address, then laid over the server's own
//! process environment.
//!
//! # Example
//!
//! ```rust,ignore
//! use env_dump::config::ServerConfig;
//! use env_dump::request::BodyLimits;
//! use env_dump::server::Server;
//!
//! let server = Server::bind(ServerConfig::default(), BodyLimits::default()).await?;
//! println!("listening on {}", server.local_addr());
//! server.run_until(tokio::signal::ctrl_c()).await?;
//! ```

mod connection;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::config::ServerConfig;
use crate::core::{Result, RuntimeInfo};
use crate::request::BodyLimits;

pub use connection::cgi_environment;
use connection::ConnectionContext;

/// Bound, not yet running, inspector server.
pub struct Server {
    listener: TcpListener,
    ctx: ConnectionContext,
}

impl Server {
    /// Bind the listen address from `config`.
    ///
    /// The process environment is captured once here when
    /// `include_process_env` is set.
    pub async fn bind(config: ServerConfig, limits: BodyLimits) -> Result<Self> {
        let listener = TcpListener::bind(config.listen_addr).await?;
        let local_addr = listener.local_addr()?;

        let base_env = if config.include_process_env {
            std::env::vars_os()
                .map(|(k, v)| {
                    (
                        k.to_string_lossy().into_owned(),
                        v.to_string_lossy().into_owned(),
                    )
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            listener,
            ctx: ConnectionContext {
                limits,
                runtime: RuntimeInfo::current(),
                base_env,
                local_addr,
                header_timeout: config.header_timeout,
                access_log_enabled: config.access_log,
                service_name: "env_dump".to_string(),
            },
        })
    }

    /// Service name written into access log lines.
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.ctx.service_name = name.into();
        self
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.ctx.local_addr
    }

    /// Serve until the process is killed.
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Serve until `shutdown` completes.
    ///
    /// Stops accepting new connections; in-flight connections finish on
    /// their own tasks.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future,
    {
        let Server { listener, ctx } = self;
        let ctx = Arc::new(ctx);

        info!(
            addr = %ctx.local_addr,
            process_env = !ctx.base_env.is_empty(),
            access_log = ctx.access_log_enabled,
            "Listening on http://{}",
            ctx.local_addr
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                result = listener.accept() => {
                    let (stream, remote_addr) = match result {
                        Ok(conn) => conn,
                        Err(e) => {
                            error!("Accept error: {}", e);
                            continue;
                        }
                    };

                    let _ = stream.set_nodelay(true);

                    let ctx = Arc::clone(&ctx);
                    tokio::spawn(async move {
                        ctx.handle_connection(stream, remote_addr).await;
                    });
                }
                _ = &mut shutdown => {
                    debug!("Shutdown signal received, stopping accept loop");
                    break;
                }
            }
        }

        Ok(())
    }
}
