//! Live tournament snapshot server.
//!
//! Streams redacted tournament snapshots to viewers over SSE, reading from
//! PostgreSQL or from an in-memory store seeded with a JSON file.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Error};
use lb_server::{
    api,
    config::{CliOverrides, ServerConfig, StoreBackend},
    logging, metrics,
};
use live_bracket::{
    SnapshotFeed,
    store::{MemorySnapshotStore, PgSnapshotStore, SnapshotStore},
};
use pico_args::Arguments;
use tracing::{error, info, warn};

const HELP: &str = "\
Serve live tournament snapshots over Server-Sent Events

USAGE:
  lb_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]
  --memory     FILE        Serve from a JSON seed file instead of PostgreSQL

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  MEMORY_SEED              Same as --memory
  FEED_TICK_MS             Push interval per subscriber in ms [default: 2000]
  FEED_CHANNEL_CAPACITY    Frames buffered per subscriber [default: 16]
  METRICS_BIND             Prometheus exporter address (disabled if unset)
  DB_MAX_CONNECTIONS       Pool upper bound [default: 20]
  RUST_LOG                 Log filter [default: info,sqlx=warn,hyper=warn]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = CliOverrides {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        memory_seed: pargs.opt_value_from_str("--memory")?,
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("Unexpected arguments: {:?}\n\n{}", remaining, HELP);
    }

    logging::init();

    let config = ServerConfig::from_env(overrides)?;
    config.validate()?;

    let store: Arc<dyn SnapshotStore> = match &config.store {
        StoreBackend::Postgres(db_config) => {
            info!(
                max_connections = db_config.max_connections,
                "Connecting to database"
            );
            let store = PgSnapshotStore::connect(db_config)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
            info!("Database connected successfully");
            Arc::new(store)
        }
        StoreBackend::Memory { seed_path } => Arc::new(load_seed(seed_path).await?),
    };

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(Error::msg)?;
        info!("Prometheus exporter listening on {}", addr);
    }

    let feed = SnapshotFeed::new(store, config.feed.clone());
    let tick_interval = feed.config().tick_interval;
    let app = api::create_router(api::AppState { feed });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{} (tick {:?}). Press Ctrl+C to stop.",
        config.bind, tick_interval
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

async fn load_seed(path: &Path) -> Result<MemorySnapshotStore, Error> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let store = MemorySnapshotStore::from_json_str(&json)
        .with_context(|| format!("Failed to load seed file {}", path.display()))?;

    let count = store.len().await;
    if count == 0 {
        warn!("Seed file {} holds no tournaments", path.display());
    }
    info!("Serving {} tournament(s) from memory", count);
    Ok(store)
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
