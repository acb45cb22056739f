use std::net::SocketAddr;

use bookcase_server::{seed, ApiError, Config, Library};
use clap::Parser;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// REST service for a personal library catalog.
#[derive(Debug, Parser)]
#[command(name = "bookcase-server")]
#[command(version)]
struct Cli {
    /// Address to listen on. Falls back to 127.0.0.1:$PORT, then 127.0.0.1:3000.
    #[arg(long, env = "BOOKCASE_ADDR", value_name = "IP:PORT")]
    addr: Option<SocketAddr>,

    /// Expose POST /devmode/populate and POST /devmode/depopulate.
    #[arg(long, env = "BOOKCASE_DEVMODE")]
    devmode: bool,

    /// Load the sample catalog before serving.
    #[arg(long)]
    seed: bool,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, env = "BOOKCASE_LOG", default_value = "info")]
    log_level: String,
}

#[derive(Debug, Error)]
enum ServerError {
    #[error("invalid PORT value {0:?}")]
    Port(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("failed to load sample catalog: {0}")]
    Seed(ApiError),

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let addr = listen_addr(cli.addr, std::env::var("PORT").ok())?;

    let mut library = Library::new();
    if cli.seed {
        seed::populate(&mut library).map_err(ServerError::Seed)?;
    }

    let config = Config {
        devmode: cli.devmode,
    };
    if config.devmode {
        tracing::info!("dev mode routes enabled");
    }

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let app = bookcase_server::app_with_library(config, library);
    bookcase_server::serve(listener, app)
        .await
        .map_err(ServerError::Serve)
}

/// `--addr` wins; otherwise loopback on `port`, defaulting to 3000.
fn listen_addr(addr: Option<SocketAddr>, port: Option<String>) -> Result<SocketAddr, ServerError> {
    if let Some(addr) = addr {
        return Ok(addr);
    }
    let port: u16 = match port {
        Some(port) => port.parse().map_err(|_| ServerError::Port(port))?,
        None => 3000,
    };
    Ok(SocketAddr::from(([127, 0, 0, 1], port)))
}

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
