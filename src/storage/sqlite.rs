use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use super::{models::Node, NodeLookup};

/// SQLite implementation of NodeLookup
pub struct SqliteNodeStore {
    pool: SqlitePool,
}

impl SqliteNodeStore {
    /// Create a new SQLite node store with the given database URL
    pub async fn new(database_url: &str) -> Result<Self> {
        info!("Connecting to SQLite database: {}", database_url);

        // Parse connection options and enable create_if_missing
        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS nodes (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                title TEXT,
                title_alternative TEXT
            )
            "#,
        )
        .execute(&pool)
        .await?;

        // Every alias column is a lookup key
        for column in ["name", "title", "title_alternative"] {
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS idx_nodes_{column} ON nodes({column})"
            ))
            .execute(&pool)
            .await?;
        }

        info!("SQLite node store initialized successfully");

        Ok(Self { pool })
    }

    /// Insert a node, replacing any existing row with the same id
    pub async fn upsert_node(&self, node: &Node) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO nodes (id, name, title, title_alternative)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                title = excluded.title,
                title_alternative = excluded.title_alternative
            "#,
        )
        .bind(node.id)
        .bind(&node.name)
        .bind(&node.title)
        .bind(&node.title_alternative)
        .execute(&self.pool)
        .await?;

        debug!("Upserted node {} ({})", node.id, node.name);
        Ok(())
    }

    /// Load a JSON array of nodes from `path`, returning how many were stored
    pub async fn import_file(&self, path: &Path) -> Result<usize> {
        let raw = tokio::fs::read_to_string(path).await?;
        let nodes: Vec<Node> = serde_json::from_str(&raw)?;

        for node in &nodes {
            self.upsert_node(node).await?;
        }

        info!("Imported {} node(s) from {}", nodes.len(), path.display());
        Ok(nodes.len())
    }
}

#[async_trait]
impl NodeLookup for SqliteNodeStore {
    async fn find_node(&self, name: &str) -> Result<Option<Node>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, (i64, String, Option<String>, Option<String>)>(
            r#"
            SELECT id, name, title, title_alternative
            FROM nodes
            WHERE name = ? OR title = ? OR title_alternative = ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(name)
        .bind(name)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, name, title, title_alternative)| Node {
            id,
            name,
            title,
            title_alternative,
        }))
    }
}
