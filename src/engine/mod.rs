pub mod elastic;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::query::SearchBody;

/// Failure talking to the search engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// No response within the configured deadline
    #[error("search engine timed out: {0}")]
    Timeout(String),

    /// The engine (or the connection to it) reported an error
    #[error("search engine transport error (status {status:?}): {detail}")]
    Transport { status: Option<u16>, detail: Value },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Trait defining the search engine interface
/// The orchestrator only needs full-text search and the analyzer endpoint.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Run a compiled search body against the topic index
    async fn search(&self, body: &SearchBody) -> Result<RawSearchResponse, EngineError>;

    /// Tokenize `text` with the named analyzer
    async fn analyze(&self, text: &str, analyzer: &str) -> Result<Vec<AnalyzedToken>, EngineError>;
}

/// Search response envelope as returned by the engine
#[derive(Debug, Clone, Deserialize)]
pub struct RawSearchResponse {
    pub took: u64,
    #[serde(default)]
    pub timed_out: bool,
    pub hits: RawHits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawHits {
    pub total: RawTotal,
    #[serde(default)]
    pub hits: Vec<RawHit>,
}

/// Older engines report a bare count, newer ones `{ value, relation }`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTotal {
    Count(u64),
    Tracked { value: u64 },
}

impl RawTotal {
    pub fn value(&self) -> u64 {
        match self {
            RawTotal::Count(count) => *count,
            RawTotal::Tracked { value } => *value,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_source", default, deserialize_with = "null_as_default")]
    pub source: TopicSource,
    #[serde(default)]
    pub highlight: Option<BTreeMap<String, Vec<String>>>,
}

/// Stored topic fields requested through `_source`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TopicSource {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    pub created: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub node: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub replies: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub member: String,
}

/// Stored documents may carry explicit nulls; read them as the field's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalyzedToken {
    pub token: String,
}
