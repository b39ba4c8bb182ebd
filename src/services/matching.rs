use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{JoinColumn, RelationType, TableRelation, TableSource};
use crate::services::discovery::MetadataDiscovery;
use crate::services::engine::EngineError;
use crate::storage::MetadataStorage;

/// A suggested relation between physical tables, produced by a matching
/// strategy (typically LLM-backed, plugged in from outside the core).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationSuggestion {
    pub name: String,
    pub left_table: TableSource,
    pub right_table: TableSource,
    pub relation_type: RelationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_column: Option<JoinColumn>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Strategy confidence, 0.0 to 1.0.
    pub confidence: f64,
}

impl RelationSuggestion {
    pub fn into_relation(self, id: String) -> TableRelation {
        TableRelation {
            id,
            name: self.name,
            left_table: self.left_table,
            right_table: self.right_table,
            relation_type: self.relation_type,
            join_column: self.join_column,
            description: self.description,
        }
    }
}

/// Column metadata handed to a strategy.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

/// A physical table with its columns, as discovered from the executor.
#[derive(Debug, Clone, Serialize)]
pub struct PhysicalTableInfo {
    pub catalog: String,
    pub schema: String,
    pub table: String,
    pub columns: Vec<ColumnInfo>,
}

/// Everything a strategy gets to work with.
#[derive(Debug, Clone, Serialize)]
pub struct MatchingContext {
    pub physical_tables: Vec<PhysicalTableInfo>,
    pub existing_relations: Vec<TableRelation>,
    pub max_suggestions: usize,
}

/// Pluggable relation-matching strategy.
#[async_trait]
pub trait MatchingStrategy: Send + Sync {
    async fn suggest_relations(
        &self,
        ctx: &MatchingContext,
    ) -> anyhow::Result<Vec<RelationSuggestion>>;
}

/// Orchestrates matching through a configured strategy.
pub struct Matcher {
    strategy: Box<dyn MatchingStrategy>,
}

impl Matcher {
    pub fn new(strategy: Box<dyn MatchingStrategy>) -> Self {
        Self { strategy }
    }

    pub async fn suggest_relations(
        &self,
        ctx: &MatchingContext,
    ) -> anyhow::Result<Vec<RelationSuggestion>> {
        self.strategy.suggest_relations(ctx).await
    }
}

/// Builds a `MatchingContext` by walking the live topology. Catalogs,
/// schemas or tables that fail to enumerate are skipped so one broken
/// connector does not block matching across the rest.
pub async fn build_matching_context(
    discovery: &dyn MetadataDiscovery,
    storage: &dyn MetadataStorage,
    max_suggestions: usize,
) -> Result<MatchingContext, EngineError> {
    let mut physical_tables = Vec::new();

    for catalog in discovery.discover_catalogs().await? {
        let Ok(schemas) = discovery.discover_schemas(&catalog.name).await else {
            continue;
        };
        for schema in schemas {
            let Ok(tables) = discovery.discover_tables(&catalog.name, &schema.name).await else {
                continue;
            };
            for table in tables {
                let Ok(columns) = discovery
                    .discover_columns(&catalog.name, &schema.name, &table.name)
                    .await
                else {
                    continue;
                };
                physical_tables.push(PhysicalTableInfo {
                    catalog: catalog.name.clone(),
                    schema: schema.name.clone(),
                    table: table.name.clone(),
                    columns: columns
                        .into_iter()
                        .map(|c| ColumnInfo {
                            name: c.name,
                            data_type: c.data_type,
                        })
                        .collect(),
                });
            }
        }
    }

    Ok(MatchingContext {
        physical_tables,
        existing_relations: storage.list_table_relations(),
        max_suggestions,
    })
}
