//! Recording ledger server.
//!
//! Serves the in-memory ledger over HTTP. All state is lost on exit.

use anyhow::Error;
use pico_args::Arguments;
use rl_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging, metrics,
};
use std::net::SocketAddr;
use tracing::info;

const HELP: &str = "\
Run the recording ledger server

USAGE:
  rl_server [OPTIONS]

OPTIONS:
  --bind          IP:PORT  Server socket bind address   [default: env SERVER_BIND or 127.0.0.1:8080]
  --metrics-bind  IP:PORT  Prometheus exporter address  [default: env METRICS_BIND, disabled if unset]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  METRICS_BIND             Prometheus exporter bind address
  BLOCKING_THREADS         Maximum blocking threads for ledger calls [default: 64]
  RUST_LOG                 Log filter [default: info,tower_http=warn]
";

struct Args {
    bind: Option<SocketAddr>,
    metrics_bind: Option<SocketAddr>,
}

fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        metrics_bind: pargs.opt_value_from_str("--metrics-bind")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.metrics_bind)?;
    config.validate()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .max_blocking_threads(config.blocking_threads)
        .build()?;

    runtime.block_on(serve(config))
}

async fn serve(config: ServerConfig) -> Result<(), Error> {
    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics available at http://{}/metrics", addr);
    }

    let app = api::create_router(AppState::new());

    info!("Starting HTTP server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {e}");
        std::future::pending::<()>().await;
    }
}
