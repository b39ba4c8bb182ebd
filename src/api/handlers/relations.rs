use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::middleware::AppError;
use crate::api::routes::AppState;
use crate::models::{
    ColumnMapping, GlobalColumn, GlobalTable, TableRelation, TableSource,
};
use crate::services::matching::{build_matching_context, RelationSuggestion};

pub async fn create_relation(
    State(state): State<AppState>,
    Json(mut relation): Json<TableRelation>,
) -> Result<(StatusCode, Json<TableRelation>), AppError> {
    if relation.id.is_empty() {
        relation.id = Uuid::new_v4().to_string();
    }
    state.storage.create_table_relation(relation.clone())?;

    // Seed a matching global table so the relation is queryable by name.
    // A failure here leaves the relation itself in place.
    if let Err(e) = auto_create_global_table(&state, &relation).await {
        tracing::warn!(
            "failed to auto-create global table for relation '{}': {}",
            relation.name,
            e
        );
    }

    Ok((StatusCode::CREATED, Json(relation)))
}

pub async fn list_relations(State(state): State<AppState>) -> Json<Vec<TableRelation>> {
    Json(state.storage.list_table_relations())
}

pub async fn get_relation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TableRelation>, AppError> {
    Ok(Json(state.storage.get_table_relation(&id)?))
}

pub async fn delete_relation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.storage.delete_table_relation(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates the global table named after a relation, with global columns
/// discovered from its first physical arm and column mappings for every
/// physical arm.
async fn auto_create_global_table(
    state: &AppState,
    relation: &TableRelation,
) -> Result<(), AppError> {
    if state.storage.get_global_table(&relation.name).is_ok() {
        return Ok(());
    }

    state.storage.create_global_table(GlobalTable {
        name: relation.name.clone(),
        description: format!("Auto-generated from {} relation", relation.relation_type),
    })?;

    let physical_arms: Vec<(&String, &String, &String)> = [&relation.left_table, &relation.right_table]
        .into_iter()
        .filter_map(|source| match source {
            TableSource::Physical {
                catalog,
                schema,
                table,
            } => Some((catalog, schema, table)),
            TableSource::Relation { .. } => None,
        })
        .collect();

    let Some((catalog, schema, table)) = physical_arms.first() else {
        // Nothing to discover from; the relation only nests other relations.
        return Ok(());
    };

    let columns = state.discovery.discover_columns(catalog, schema, table).await?;
    for column in columns {
        let created = state.storage.create_global_column(GlobalColumn {
            global_table_name: relation.name.clone(),
            name: column.name.clone(),
            data_type: column.data_type.clone(),
            description: format!("Auto-discovered from {catalog}.{schema}.{table}"),
        });
        if let Err(e) = created {
            tracing::warn!("failed to create global column '{}': {}", column.name, e);
            continue;
        }

        for (arm_catalog, arm_schema, arm_table) in &physical_arms {
            let mapped = state.storage.create_column_mapping(ColumnMapping {
                global_table_name: relation.name.clone(),
                global_column_name: column.name.clone(),
                catalog_name: (*arm_catalog).clone(),
                schema_name: (*arm_schema).clone(),
                table_name: (*arm_table).clone(),
                column_name: column.name.clone(),
            });
            if let Err(e) = mapped {
                tracing::warn!(
                    "failed to map column '{}' in {}.{}.{}: {}",
                    column.name,
                    arm_catalog,
                    arm_schema,
                    arm_table,
                    e
                );
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Auto-matching
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoMatchRequest {
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    #[serde(default = "default_auto_create")]
    pub auto_create: bool,
}

fn default_max_suggestions() -> usize {
    5
}

fn default_auto_create() -> bool {
    true
}

impl Default for AutoMatchRequest {
    fn default() -> Self {
        Self {
            max_suggestions: default_max_suggestions(),
            auto_create: default_auto_create(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoMatchResponse {
    pub suggestions: Vec<RelationSuggestion>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub created_relations: Vec<TableRelation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Asks the configured matching strategy for relation suggestions and
/// optionally creates them. Answers 501 until a strategy is plugged in.
pub async fn auto_match(
    State(state): State<AppState>,
    body: axum::body::Bytes,
) -> Result<Json<AutoMatchResponse>, AppError> {
    // A missing or malformed body falls back to the defaults.
    let request: AutoMatchRequest = serde_json::from_slice(&body).unwrap_or_default();
    let matcher = state.matcher.as_ref().ok_or_else(|| {
        AppError::NotImplemented("no relation matching strategy is configured".to_string())
    })?;

    let ctx = build_matching_context(
        state.discovery.as_ref(),
        state.storage.as_ref(),
        request.max_suggestions.max(1),
    )
    .await?;
    let suggestions = matcher.suggest_relations(&ctx).await?;

    let mut created_relations = Vec::new();
    let mut errors = Vec::new();
    if request.auto_create {
        let mut existing_names: Vec<String> = state
            .storage
            .list_table_relations()
            .into_iter()
            .map(|r| r.name)
            .collect();

        for suggestion in suggestions.clone() {
            let mut relation = suggestion.into_relation(Uuid::new_v4().to_string());

            // Suffix colliding names instead of dropping the suggestion.
            let original_name = relation.name.clone();
            let mut suffix = 1;
            while existing_names.contains(&relation.name) {
                relation.name = format!("{original_name}_v{suffix}");
                suffix += 1;
            }

            if let Err(e) = validate_relation_arms(&state, &relation).await {
                errors.push(format!("Invalid relation '{}': {}", relation.name, e));
                continue;
            }
            if let Err(e) = state.storage.create_table_relation(relation.clone()) {
                errors.push(format!("Failed to create '{}': {}", relation.name, e));
                continue;
            }
            if let Err(e) = auto_create_global_table(&state, &relation).await {
                tracing::warn!(
                    "failed to auto-create global table for '{}': {}",
                    relation.name,
                    e
                );
            }

            existing_names.push(relation.name.clone());
            created_relations.push(relation);
        }
    }

    Ok(Json(AutoMatchResponse {
        suggestions,
        created_relations,
        errors,
    }))
}

/// Confirms that both physical arms of a suggested relation still exist on
/// the executor before persisting it.
async fn validate_relation_arms(
    state: &AppState,
    relation: &TableRelation,
) -> Result<(), AppError> {
    for (side, source) in [("left", &relation.left_table), ("right", &relation.right_table)] {
        if let TableSource::Physical {
            catalog,
            schema,
            table,
        } = source
        {
            state
                .discovery
                .discover_columns(catalog, schema, table)
                .await
                .map_err(|e| {
                    AppError::Validation(format!("{side} table not found: {e}"))
                })?;
        }
    }
    Ok(())
}
