pub mod trino;

pub use trino::TrinoEngine;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// One result row, keyed by the executor's column names with their original
/// casing preserved.
pub type Row = serde_json::Map<String, Value>;

/// Downstream engine failures. These propagate unchanged through discovery
/// and the store-facing services.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The executor could not be reached or answered outside its protocol.
    #[error("executor request failed: {0}")]
    Transport(String),

    /// The executor accepted the request but rejected or failed the query.
    #[error("query failed: {0}")]
    Query(String),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryResult {
    pub rows: Vec<Row>,
}

/// Contract over the downstream federated SQL engine: execute a statement,
/// return column-keyed rows. Implementations must be safe for concurrent
/// callers.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    async fn execute_query(
        &self,
        sql: &str,
        params: Option<HashMap<String, Value>>,
    ) -> Result<QueryResult, EngineError>;
}
