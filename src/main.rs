use tracing::{error, info};

use env_dump::config::{Config, RunMode};
use env_dump::{cgi, logging, Server};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    logging::init(&config.logging);
    config.log_summary();

    // One request at a time in CGI mode and no blocking work in serve mode
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match config.mode {
        RunMode::Cgi => {
            if let Err(e) = cgi::run(&config).await {
                error!("CGI request failed: {}", e);
                return Err(e.into());
            }
            Ok(())
        }
        RunMode::Serve => {
            let server = Server::bind(config.server.clone(), config.limits)
                .await?
                .with_service_name(&config.logging.service_name);

            let shutdown = async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutting down...");
            };

            if let Err(e) = server.run_until(shutdown).await {
                error!("Server error: {}", e);
                return Err(e.into());
            }
            Ok(())
        }
    }
}
