use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::handlers::{catalogs, discovery, global, health, query, relations, sync};
use crate::services::discovery::MetadataDiscovery;
use crate::services::engine::QueryEngine;
use crate::services::matching::Matcher;
use crate::services::query::Translator;
use crate::services::sync::MetadataSync;
use crate::storage::MetadataStorage;

/// Shared application state, handed to every handler by reference.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn MetadataStorage>,
    pub engine: Arc<dyn QueryEngine>,
    pub discovery: Arc<dyn MetadataDiscovery>,
    pub sync: Arc<MetadataSync>,
    pub translator: Arc<Translator>,
    /// Optional relation-matching hook; the auto-match endpoint answers
    /// 501 while this is unset.
    pub matcher: Option<Arc<Matcher>>,
}

/// Create the application router with all routes registered.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        // Raw and global query surfaces
        .route("/query", post(query::execute_query))
        .route("/query/global", post(query::execute_global_query))
        // Store reads over the synced physical hierarchy
        .route("/catalogs", get(catalogs::list_catalogs))
        .route("/catalogs/{catalog}", get(catalogs::get_catalog))
        .route("/catalogs/{catalog}/schemas", get(catalogs::list_schemas))
        .route(
            "/catalogs/{catalog}/schemas/{schema}/tables",
            get(catalogs::list_tables),
        )
        .route(
            "/catalogs/{catalog}/schemas/{schema}/tables/{table}/columns",
            get(catalogs::list_columns),
        )
        // Live discovery, bypassing the store
        .route(
            "/discover/catalogs/{catalog}/schemas/{schema}/tables",
            get(discovery::discover_tables),
        )
        .route(
            "/discover/catalogs/{catalog}/schemas/{schema}/tables/{table}/columns",
            get(discovery::discover_columns),
        )
        // Reconciliation
        .route("/sync", post(sync::sync_all))
        // Global schema overlay
        .route(
            "/global/tables",
            get(global::list_global_tables).post(global::create_global_table),
        )
        .route(
            "/global/tables/{name}",
            get(global::get_global_table).delete(global::delete_global_table),
        )
        .route(
            "/global/tables/{name}/columns",
            get(global::list_global_columns).post(global::create_global_column),
        )
        .route(
            "/global/tables/{name}/columns/{column}",
            axum::routing::delete(global::delete_global_column),
        )
        .route(
            "/global/tables/{name}/mappings/tables",
            get(global::list_table_mappings)
                .post(global::create_table_mapping)
                .delete(global::delete_table_mapping),
        )
        .route(
            "/global/tables/{name}/columns/{column}/mappings",
            get(global::list_column_mappings)
                .post(global::create_column_mapping)
                .delete(global::delete_column_mapping),
        )
        // Relations
        .route(
            "/relations",
            get(relations::list_relations).post(relations::create_relation),
        )
        .route(
            "/relations/{id}",
            get(relations::get_relation).delete(relations::delete_relation),
        )
        .route("/relations/auto-match", post(relations::auto_match))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
