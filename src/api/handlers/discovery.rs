use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::middleware::AppError;
use crate::api::routes::AppState;
use crate::models::{Column, Table};

/// List tables straight from the executor, bypassing the store.
pub async fn discover_tables(
    State(state): State<AppState>,
    Path((catalog, schema)): Path<(String, String)>,
) -> Result<Json<Vec<Table>>, AppError> {
    let tables = state.discovery.discover_tables(&catalog, &schema).await?;
    Ok(Json(tables))
}

/// Describe a table's columns straight from the executor.
pub async fn discover_columns(
    State(state): State<AppState>,
    Path((catalog, schema, table)): Path<(String, String, String)>,
) -> Result<Json<Vec<Column>>, AppError> {
    let columns = state
        .discovery
        .discover_columns(&catalog, &schema, &table)
        .await?;
    Ok(Json(columns))
}
