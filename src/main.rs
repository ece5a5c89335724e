mod api;
mod config;
mod engine;
mod query;
mod search;
mod storage;

#[cfg(test)]
mod integration_tests;

use anyhow::Result;
use clap::Parser;
use config::{Cli, Config};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use engine::elastic::ElasticEngine;
use search::{SearchLimits, SearchService};
use storage::sqlite::SqliteNodeStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with env filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting topic search service");

    // Load configuration from .env and environment, then CLI overrides
    let config = Config::from_env()?;
    let cli = Cli::parse();
    let config = config.with_cli(&cli);

    info!("Configuration:");
    info!("  Listen address: {}", config.bind_addr());
    info!("  Search engine: {} (index {})", config.es_url, config.es_index);
    info!("  Engine timeout: {:?}", config.es_timeout);
    info!("  Node store: {}", config.database_url);
    info!("  Paging depth ceiling: {}", config.paging_depth_max);
    info!("  CORS: {}", if config.enable_cors { "enabled" } else { "disabled" });

    // Search engine client; refuse to start if the cluster is unreachable
    let engine = ElasticEngine::new(&config.es_url, &config.es_index, config.es_timeout)?;
    if let Err(e) = engine.version().await {
        error!("Search engine unavailable at {}: {:#}", config.es_url, e);
        return Err(e);
    }

    // Node lookup store
    info!("Initializing node store...");
    let nodes = SqliteNodeStore::new(&config.database_url).await?;
    if let Some(path) = &cli.import_nodes {
        nodes.import_file(path).await?;
    }
    info!("Node store initialized");

    let limits = SearchLimits::default().with_max_depth(config.paging_depth_max);
    let service = SearchService::new(Arc::new(engine), Arc::new(nodes), limits)
        .with_lookup_timeout(config.lookup_timeout);

    let router = api::create_router(service, config.enable_cors);

    // Set up graceful shutdown signal handling
    let shutdown_signal = async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    error!("Failed to install signal handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C signal");
            },
            _ = terminate => {
                info!("Received terminate signal");
            },
        }
    };

    match api::start_server_with_shutdown(router, &config.bind_addr(), shutdown_signal).await {
        Ok(_) => {
            info!("Server shutdown completed gracefully");
            Ok(())
        }
        Err(e) => {
            error!("Server error: {}", e);
            Err(e)
        }
    }
}
