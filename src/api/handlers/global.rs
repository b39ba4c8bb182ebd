use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::middleware::AppError;
use crate::api::routes::AppState;
use crate::models::{ColumnMapping, GlobalColumn, GlobalTable, TableMapping};

// ---------------------------------------------------------------------------
// Global tables
// ---------------------------------------------------------------------------

pub async fn create_global_table(
    State(state): State<AppState>,
    Json(table): Json<GlobalTable>,
) -> Result<(StatusCode, Json<GlobalTable>), AppError> {
    state.storage.create_global_table(table.clone())?;
    Ok((StatusCode::CREATED, Json(table)))
}

pub async fn list_global_tables(State(state): State<AppState>) -> Json<Vec<GlobalTable>> {
    Json(state.storage.list_global_tables())
}

pub async fn get_global_table(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<GlobalTable>, AppError> {
    Ok(Json(state.storage.get_global_table(&name)?))
}

pub async fn delete_global_table(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    state.storage.delete_global_table(&name)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Global columns
// ---------------------------------------------------------------------------

pub async fn create_global_column(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(mut column): Json<GlobalColumn>,
) -> Result<(StatusCode, Json<GlobalColumn>), AppError> {
    // The path names the table; it wins over whatever the body carries.
    column.global_table_name = name;
    state.storage.create_global_column(column.clone())?;
    Ok((StatusCode::CREATED, Json(column)))
}

pub async fn list_global_columns(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<Vec<GlobalColumn>> {
    Json(state.storage.list_global_columns(&name))
}

pub async fn delete_global_column(
    State(state): State<AppState>,
    Path((name, column)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    state.storage.delete_global_column(&name, &column)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Table mappings
// ---------------------------------------------------------------------------

pub async fn create_table_mapping(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(mut mapping): Json<TableMapping>,
) -> Result<(StatusCode, Json<TableMapping>), AppError> {
    mapping.global_table_name = name;
    state.storage.create_table_mapping(mapping.clone())?;
    Ok((StatusCode::CREATED, Json(mapping)))
}

pub async fn list_table_mappings(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<Vec<TableMapping>> {
    Json(state.storage.list_table_mappings(&name))
}

/// Deletes the mapping identified by the physical triple in the body.
pub async fn delete_table_mapping(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(mapping): Json<TableMapping>,
) -> Result<StatusCode, AppError> {
    state.storage.delete_table_mapping(
        &name,
        &mapping.catalog_name,
        &mapping.schema_name,
        &mapping.table_name,
    )?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Column mappings
// ---------------------------------------------------------------------------

pub async fn create_column_mapping(
    State(state): State<AppState>,
    Path((name, column)): Path<(String, String)>,
    Json(mut mapping): Json<ColumnMapping>,
) -> Result<(StatusCode, Json<ColumnMapping>), AppError> {
    mapping.global_table_name = name;
    mapping.global_column_name = column;
    state.storage.create_column_mapping(mapping.clone())?;
    Ok((StatusCode::CREATED, Json(mapping)))
}

pub async fn list_column_mappings(
    State(state): State<AppState>,
    Path((name, column)): Path<(String, String)>,
) -> Json<Vec<ColumnMapping>> {
    Json(state.storage.list_column_mappings(&name, &column))
}

/// Deletes the mapping identified by the physical tuple in the body.
pub async fn delete_column_mapping(
    State(state): State<AppState>,
    Path((name, column)): Path<(String, String)>,
    Json(mapping): Json<ColumnMapping>,
) -> Result<StatusCode, AppError> {
    state.storage.delete_column_mapping(
        &name,
        &column,
        &mapping.catalog_name,
        &mapping.schema_name,
        &mapping.table_name,
        &mapping.column_name,
    )?;
    Ok(StatusCode::NO_CONTENT)
}
