//! tritier: application tier of a three-tier demo.
//!
//! This is the application entry point. It initializes tracing, resolves
//! configuration from the optional TOML file and the environment, connects to the
//! document store, sets up the Axum router and serves until a shutdown signal.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tritier::config::{AppConfig, LoggingConfig, DEFAULT_LOG_FILTER};
use tritier::http::start_server;
use tritier::routes::create_router;
use tritier::state::AppState;
use tritier::store::{MongoStore, StoreError};
use tritier::templates::init_templates;

/// tritier: color-themed pages and a message board backed by MongoDB
#[derive(Parser, Debug)]
#[command(name = "tritier", version, about)]
struct Args {
    /// Optional TOML file with http, store and logging settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level filter (e.g., "tritier=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

fn init_tracing(log_filter: &str, logging: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(log_filter));
    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = Args::parse();

    // Configuration errors are fatal before anything is served
    let config = AppConfig::load(args.config.as_deref())?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    init_tracing(&log_filter, &config.logging);

    tracing::info!(
        store_host = %config.store.host,
        store_port = config.store.port,
        database = %config.store.settings.database,
        has_auth = config.store.has_credentials(),
        default_color = %config.colors.default_color,
        allowed_colors = ?config.colors.allowed_colors,
        fail_flag = config.fail_flag,
        "Loaded configuration"
    );

    let tera = init_templates()?;
    tracing::info!("Initialized templates");

    // An unreachable store is not fatal: readiness stays down until it answers
    let store = match MongoStore::connect(&config.store).await {
        Ok(store) => store,
        Err(StoreError::Unavailable(reason)) => {
            tracing::warn!(%reason, "Document store not reachable at startup, serving as not ready");
            MongoStore::new(&config.store)?
        }
        Err(e) => return Err(e.into()),
    };
    let store = Arc::new(store);

    let http_config = config.http.clone();
    let state = AppState::new(config, tera, store.clone());
    let app = create_router(state);

    let served = start_server(app, &http_config).await;

    store.shutdown().await;
    served?;

    Ok(())
}
