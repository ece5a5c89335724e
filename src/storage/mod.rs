pub mod models;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use models::Node;

/// Trait defining the category lookup interface
/// This allows swapping lookup stores (SQLite, MongoDB, an HTTP directory, etc.)
#[async_trait]
pub trait NodeLookup: Send + Sync {
    /// Find the node whose name, title or alternative title equals `name`
    async fn find_node(&self, name: &str) -> Result<Option<Node>>;
}
