use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::api::middleware::AppError;
use crate::api::routes::AppState;
use crate::services::engine::Row;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub params: Option<HashMap<String, Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub rows: Vec<Row>,
    pub row_count: usize,
}

/// Execute raw SQL directly against the executor.
pub async fn execute_query(
    State(state): State<AppState>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    // The executor rejects trailing semicolons.
    let query = payload.query.trim().trim_end_matches(';').to_string();
    if query.is_empty() {
        return Err(AppError::Validation("query must not be empty".to_string()));
    }

    let result = state.engine.execute_query(&query, payload.params).await?;
    let row_count = result.rows.len();
    Ok(Json(QueryResponse {
        rows: result.rows,
        row_count,
    }))
}

#[derive(Debug, Deserialize)]
pub struct GlobalQueryRequest {
    pub query: String,
}

/// Execute a query written against the global schema: translate it to
/// physical SQL, run it, and return the rows with the generated SQL.
pub async fn execute_global_query(
    State(state): State<AppState>,
    Json(payload): Json<GlobalQueryRequest>,
) -> Result<Json<crate::services::query::GlobalQueryResult>, AppError> {
    if payload.query.trim().is_empty() {
        return Err(AppError::Validation("query field is required".to_string()));
    }

    tracing::info!("translating global query: {}", payload.query);
    let result = state.translator.translate_and_execute(&payload.query).await?;
    tracing::info!("generated SQL: {}", result.generated_sql);
    Ok(Json(result))
}
