use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Depth ceilings the service can be deployed with
pub const PAGING_DEPTH_PROFILES: [u64; 2] = [200, 1000];

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub api_port: u16,
    pub es_url: String,
    pub es_index: String,
    pub es_timeout: Duration,
    pub database_url: String,
    pub lookup_timeout: Duration,
    pub paging_depth_max: u64,
    pub enable_cors: bool,
}

/// Command-line overrides; each flag falls back to its environment variable
#[derive(Debug, Default, Parser)]
#[command(name = "topic-search", about = "Keyword search over forum topics")]
pub struct Cli {
    /// Bind host
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Bind port
    #[arg(long, env = "API_PORT")]
    pub port: Option<u16>,

    /// Search engine base URL
    #[arg(long, env = "ES_URL")]
    pub es_url: Option<String>,

    /// Node lookup database URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// JSON file of nodes to load into the lookup store before serving
    #[arg(long)]
    pub import_nodes: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (don't fail if it doesn't)
        let _ = dotenvy::dotenv();

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let api_port = std::env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;

        let es_url = std::env::var("ES_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:9200".to_string());

        let es_index = std::env::var("ES_INDEX").unwrap_or_else(|_| "topic".to_string());

        let es_timeout_secs: u64 = std::env::var("ES_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:nodes.db".to_string());

        let lookup_timeout_secs: u64 = std::env::var("LOOKUP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()?;

        let paging_depth_max: u64 = std::env::var("PAGING_DEPTH_MAX")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()?;
        if !PAGING_DEPTH_PROFILES.contains(&paging_depth_max) {
            anyhow::bail!(
                "PAGING_DEPTH_MAX must be one of {:?}, got {}",
                PAGING_DEPTH_PROFILES,
                paging_depth_max
            );
        }

        let enable_cors = std::env::var("ENABLE_CORS")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        Ok(Config {
            host,
            api_port,
            es_url,
            es_index,
            es_timeout: Duration::from_secs(es_timeout_secs),
            database_url,
            lookup_timeout: Duration::from_secs(lookup_timeout_secs),
            paging_depth_max,
            enable_cors,
        })
    }

    /// Apply command-line overrides on top of the environment
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.api_port = port;
        }
        if let Some(es_url) = &cli.es_url {
            self.es_url = es_url.clone();
        }
        if let Some(database_url) = &cli.database_url {
            self.database_url = database_url.clone();
        }
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.api_port)
    }
}
