use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::models::RelationType;
use crate::services::engine::{QueryEngine, Row};
use crate::services::query::column_mapper::ColumnMapper;
use crate::services::query::error::QueryError;
use crate::services::query::generator::SqlGenerator;
use crate::services::query::parser::{ParsedQuery, QueryParser};
use crate::services::query::relation::ResolvedRelation;
use crate::services::query::resolver::{ResolvedTableSource, TableResolver};
use crate::storage::MetadataStorage;

/// Result of translating and executing one global query.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalQueryResult {
    #[serde(rename = "generatedSQL")]
    pub generated_sql: String,
    pub rows: Vec<Row>,
    pub row_count: usize,
    pub execution_time: String,
}

/// Rewrites global-schema SQL into physical SQL and runs it on the executor.
///
/// The translator keeps no per-request state; it is safe to share across
/// concurrent requests, with concurrency bounded only by the store's lock
/// and the executor's own thread-safety.
pub struct Translator {
    parser: QueryParser,
    resolver: TableResolver,
    column_mapper: ColumnMapper,
    generator: SqlGenerator,
    engine: Arc<dyn QueryEngine>,
}

impl Translator {
    pub fn new(storage: Arc<dyn MetadataStorage>, engine: Arc<dyn QueryEngine>) -> Self {
        Self {
            parser: QueryParser::new(),
            resolver: TableResolver::new(storage.clone()),
            column_mapper: ColumnMapper::new(storage),
            generator: SqlGenerator::new(),
            engine,
        }
    }

    /// Translates a global query into executor SQL without running it.
    pub fn translate(&self, global_query: &str) -> Result<String, QueryError> {
        let parsed = self.parser.parse(global_query)?;
        let resolved = self.resolver.resolve(&parsed.table_name)?;

        let columns_to_map = if parsed.is_select_all {
            self.column_mapper.all_columns(&parsed.table_name)
        } else {
            parsed.columns.clone()
        };

        match resolved {
            ResolvedTableSource::Relation(relation) => {
                self.translate_relation(&parsed, &relation, &columns_to_map)
            }
            ResolvedTableSource::Multiple(mappings) => {
                let column_maps = self
                    .column_mapper
                    .map_columns_for_tables(&parsed.table_name, &columns_to_map, &mappings)
                    .map_err(QueryError::ColumnMapping)?;
                Ok(self.generator.generate_union(
                    &mappings,
                    &column_maps,
                    &columns_to_map,
                    parsed.where_clause.as_deref(),
                    parsed.limit,
                    parsed.is_select_all,
                )?)
            }
            ResolvedTableSource::Single(mapping) => {
                let column_map = self
                    .column_mapper
                    .map_columns(&parsed.table_name, &columns_to_map, &mapping)
                    .map_err(QueryError::ColumnMapping)?;
                Ok(self.generator.generate_select(
                    &mapping,
                    &column_map,
                    &columns_to_map,
                    parsed.where_clause.as_deref(),
                    parsed.limit,
                    parsed.is_select_all,
                )?)
            }
        }
    }

    fn translate_relation(
        &self,
        parsed: &ParsedQuery,
        relation: &ResolvedRelation,
        columns_to_map: &[String],
    ) -> Result<String, QueryError> {
        let column_maps = self
            .column_mapper
            .map_columns_for_relation(&parsed.table_name, columns_to_map, relation)
            .map_err(QueryError::ColumnMapping)?;

        let sql = match relation.relation_type {
            RelationType::Union => self.generator.generate_union_from_relation(
                relation,
                &column_maps,
                columns_to_map,
                parsed.where_clause.as_deref(),
                parsed.limit,
                parsed.is_select_all,
            )?,
            RelationType::Join => self.generator.generate_join_from_relation(
                relation,
                &column_maps,
                columns_to_map,
                parsed.where_clause.as_deref(),
                parsed.limit,
                parsed.is_select_all,
            )?,
        };
        Ok(sql)
    }

    /// Full pipeline: translate, execute on the engine, and report the
    /// generated SQL together with the rows and wall-clock time.
    pub async fn translate_and_execute(
        &self,
        global_query: &str,
    ) -> Result<GlobalQueryResult, QueryError> {
        let start = Instant::now();
        let generated_sql = self.translate(global_query)?;

        let result = self.engine.execute_query(&generated_sql, None).await?;
        let row_count = result.rows.len();

        Ok(GlobalQueryResult {
            generated_sql,
            rows: result.rows,
            row_count,
            execution_time: format!("{}ms", start.elapsed().as_millis()),
        })
    }
}
