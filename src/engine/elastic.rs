use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

use super::{AnalyzedToken, EngineError, RawSearchResponse, SearchEngine};
use crate::query::SearchBody;

/// Elasticsearch client over its REST API
#[derive(Clone)]
pub struct ElasticEngine {
    client: Client,
    base_url: String,
    index: String,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    tokens: Vec<AnalyzedToken>,
}

#[derive(Debug, Deserialize)]
struct ClusterInfo {
    version: ClusterVersion,
}

#[derive(Debug, Deserialize)]
struct ClusterVersion {
    number: String,
}

impl ElasticEngine {
    /// Create a new engine client; every call is bounded by `timeout`
    pub fn new(base_url: &str, index: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            index: index.to_string(),
        })
    }

    /// Ask the cluster for its version, confirming it is reachable
    pub async fn version(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .context("Search engine ping failed")?
            .error_for_status()
            .context("Search engine ping returned an error status")?;

        let info: ClusterInfo = response
            .json()
            .await
            .context("Unexpected search engine info payload")?;

        info!("Search engine version {}", info.version.number);
        Ok(info.version.number)
    }

    fn index_url(&self, endpoint: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.index, endpoint)
    }

    async fn post(&self, endpoint: &str, body: &Value) -> Result<Response, EngineError> {
        let url = self.index_url(endpoint);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(classify)?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let text = response.text().await.map_err(classify)?;
        // Engines wrap failures as { "error": ..., "status": ... }
        let detail = match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => parsed.get("error").cloned().unwrap_or(parsed),
            Err(_) => Value::String(text),
        };

        Err(EngineError::Transport {
            status: Some(status),
            detail,
        })
    }
}

/// Map a client failure onto the engine error taxonomy
fn classify(error: reqwest::Error) -> EngineError {
    if error.is_timeout() {
        EngineError::Timeout(error.to_string())
    } else if error.is_connect() || error.is_request() {
        EngineError::Transport {
            status: error.status().map(|s| s.as_u16()),
            detail: Value::String(error.to_string()),
        }
    } else {
        EngineError::Other(anyhow::Error::new(error))
    }
}

#[async_trait]
impl SearchEngine for ElasticEngine {
    async fn search(&self, body: &SearchBody) -> Result<RawSearchResponse, EngineError> {
        let body = serde_json::to_value(body).context("Failed to encode search body")?;
        let response = self.post("_search", &body).await?;

        let raw = response.json::<RawSearchResponse>().await.map_err(|e| {
            if e.is_timeout() {
                EngineError::Timeout(e.to_string())
            } else {
                EngineError::Other(anyhow::Error::new(e).context("Unexpected search response"))
            }
        })?;

        debug!(
            "Search took {}ms, {} total hits",
            raw.took,
            raw.hits.total.value()
        );
        Ok(raw)
    }

    async fn analyze(&self, text: &str, analyzer: &str) -> Result<Vec<AnalyzedToken>, EngineError> {
        let body = json!({
            "text": text,
            "analyzer": analyzer,
        });
        let response = self.post("_analyze", &body).await?;

        let analyzed = response.json::<AnalyzeResponse>().await.map_err(|e| {
            if e.is_timeout() {
                EngineError::Timeout(e.to_string())
            } else {
                EngineError::Other(anyhow::Error::new(e).context("Unexpected analyze response"))
            }
        })?;

        Ok(analyzed.tokens)
    }
}
