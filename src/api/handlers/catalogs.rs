use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::middleware::AppError;
use crate::api::routes::AppState;
use crate::models::{Catalog, Column, Schema, Table};

pub async fn list_catalogs(State(state): State<AppState>) -> Json<Vec<Catalog>> {
    Json(state.storage.list_catalogs())
}

pub async fn get_catalog(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Catalog>, AppError> {
    Ok(Json(state.storage.get_catalog(&name)?))
}

pub async fn list_schemas(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<Vec<Schema>> {
    Json(state.storage.list_schemas(&name))
}

pub async fn list_tables(
    State(state): State<AppState>,
    Path((catalog, schema)): Path<(String, String)>,
) -> Json<Vec<Table>> {
    Json(state.storage.list_tables(&catalog, &schema))
}

pub async fn list_columns(
    State(state): State<AppState>,
    Path((catalog, schema, table)): Path<(String, String, String)>,
) -> Json<Vec<Column>> {
    Json(state.storage.list_columns(&catalog, &schema, &table))
}
