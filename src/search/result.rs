use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::engine::{RawHit, RawSearchResponse};

/// Search result in the stable API shape, independent of the engine envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Engine-side search time in milliseconds
    pub took: u64,
    pub timed_out: bool,
    pub total: u64,
    pub hits: Vec<Hit>,
}

/// One matching topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub title: String,
    pub content: String,
    pub created: Value,
    pub id: i64,
    pub node: i64,
    pub replies: i64,
    pub member: String,
    /// Best fragment per highlighted field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<BTreeMap<String, Vec<String>>>,
}

impl From<RawHit> for Hit {
    fn from(raw: RawHit) -> Self {
        let source = raw.source;
        Self {
            title: source.title,
            content: source.content,
            created: source.created,
            id: source.id,
            node: source.node,
            replies: source.replies,
            member: source.member,
            highlight: raw.highlight.filter(|h| !h.is_empty()),
        }
    }
}

impl From<RawSearchResponse> for SearchResult {
    fn from(raw: RawSearchResponse) -> Self {
        Self {
            took: raw.took,
            timed_out: raw.timed_out,
            total: raw.hits.total.value(),
            hits: raw.hits.hits.into_iter().map(Hit::from).collect(),
        }
    }
}
