use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::models::{Catalog, Column, Schema, Table};
use crate::services::engine::{EngineError, QueryEngine, Row};

/// Discovers the live physical topology from the executor.
///
/// Identifiers are interpolated into the metadata SQL unquoted; callers must
/// not pass user-controlled names.
#[async_trait]
pub trait MetadataDiscovery: Send + Sync {
    async fn discover_catalogs(&self) -> Result<Vec<Catalog>, EngineError>;
    async fn discover_schemas(&self, catalog: &str) -> Result<Vec<Schema>, EngineError>;
    async fn discover_tables(&self, catalog: &str, schema: &str)
        -> Result<Vec<Table>, EngineError>;
    async fn discover_columns(
        &self,
        catalog: &str,
        schema: &str,
        table: &str,
    ) -> Result<Vec<Column>, EngineError>;
}

/// `MetadataDiscovery` over the executor's SHOW/DESCRIBE commands.
pub struct TrinoMetadataDiscovery {
    engine: Arc<dyn QueryEngine>,
}

impl TrinoMetadataDiscovery {
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self { engine }
    }
}

/// Projects a single column out of a result row. Rows whose projected field
/// is missing or not a string are skipped, not errors: SHOW output can carry
/// engine-specific extras.
fn project<'a>(row: &'a Row, field: &str) -> Option<&'a str> {
    row.get(field).and_then(Value::as_str)
}

#[async_trait]
impl MetadataDiscovery for TrinoMetadataDiscovery {
    async fn discover_catalogs(&self) -> Result<Vec<Catalog>, EngineError> {
        let result = self.engine.execute_query("SHOW CATALOGS", None).await?;
        Ok(result
            .rows
            .iter()
            .filter_map(|row| project(row, "Catalog"))
            .map(Catalog::new)
            .collect())
    }

    async fn discover_schemas(&self, catalog: &str) -> Result<Vec<Schema>, EngineError> {
        let query = format!("SHOW SCHEMAS FROM {catalog}");
        let result = self.engine.execute_query(&query, None).await?;
        Ok(result
            .rows
            .iter()
            .filter_map(|row| project(row, "Schema"))
            .map(|name| Schema::new(catalog, name))
            .collect())
    }

    async fn discover_tables(
        &self,
        catalog: &str,
        schema: &str,
    ) -> Result<Vec<Table>, EngineError> {
        let query = format!("SHOW TABLES FROM {catalog}.{schema}");
        let result = self.engine.execute_query(&query, None).await?;
        Ok(result
            .rows
            .iter()
            .filter_map(|row| project(row, "Table"))
            .map(|name| Table::new(catalog, schema, name))
            .collect())
    }

    async fn discover_columns(
        &self,
        catalog: &str,
        schema: &str,
        table: &str,
    ) -> Result<Vec<Column>, EngineError> {
        let query = format!("DESCRIBE {catalog}.{schema}.{table}");
        let result = self.engine.execute_query(&query, None).await?;
        Ok(result
            .rows
            .iter()
            .filter_map(|row| {
                let name = project(row, "Column")?;
                let data_type = project(row, "Type")?;
                Some(Column::new(catalog, schema, table, name, data_type))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::engine::QueryResult;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Engine stub answering from a fixed query -> rows map and recording
    /// every statement it receives.
    struct StubEngine {
        responses: HashMap<String, Vec<Row>>,
        executed: Mutex<Vec<String>>,
    }

    impl StubEngine {
        fn new(responses: Vec<(&str, Vec<Row>)>) -> Self {
            Self {
                responses: responses
                    .into_iter()
                    .map(|(sql, rows)| (sql.to_string(), rows))
                    .collect(),
                executed: Mutex::new(Vec::new()),
            }
        }
    }

    fn row(fields: &[(&str, Value)]) -> Row {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[async_trait]
    impl QueryEngine for StubEngine {
        async fn execute_query(
            &self,
            sql: &str,
            _params: Option<HashMap<String, Value>>,
        ) -> Result<QueryResult, EngineError> {
            self.executed.lock().unwrap().push(sql.to_string());
            match self.responses.get(sql) {
                Some(rows) => Ok(QueryResult { rows: rows.clone() }),
                None => Err(EngineError::Query(format!("unexpected statement: {sql}"))),
            }
        }
    }

    #[tokio::test]
    async fn test_discover_catalogs_projects_catalog_field() {
        let engine = Arc::new(StubEngine::new(vec![(
            "SHOW CATALOGS",
            vec![
                row(&[("Catalog", json!("postgresql"))]),
                row(&[("Catalog", json!("mysql"))]),
            ],
        )]));
        let discovery = TrinoMetadataDiscovery::new(engine.clone());

        let catalogs = discovery.discover_catalogs().await.unwrap();
        let names: Vec<_> = catalogs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["postgresql", "mysql"]);
        assert_eq!(*engine.executed.lock().unwrap(), vec!["SHOW CATALOGS"]);
    }

    #[tokio::test]
    async fn test_discover_skips_non_string_cells() {
        let engine = Arc::new(StubEngine::new(vec![(
            "SHOW SCHEMAS FROM pg",
            vec![
                row(&[("Schema", json!("public"))]),
                row(&[("Schema", json!(42))]),
                row(&[("Other", json!("ignored"))]),
            ],
        )]));
        let discovery = TrinoMetadataDiscovery::new(engine);

        let schemas = discovery.discover_schemas("pg").await.unwrap();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].name, "public");
        assert_eq!(schemas[0].catalog_name, "pg");
    }

    #[tokio::test]
    async fn test_discover_tables_and_columns() {
        let engine = Arc::new(StubEngine::new(vec![
            (
                "SHOW TABLES FROM pg.public",
                vec![row(&[("Table", json!("users"))])],
            ),
            (
                "DESCRIBE pg.public.users",
                vec![
                    row(&[("Column", json!("id")), ("Type", json!("bigint"))]),
                    row(&[("Column", json!("name")), ("Type", json!("varchar"))]),
                    // DESCRIBE rows missing a Type are skipped
                    row(&[("Column", json!("broken"))]),
                ],
            ),
        ]));
        let discovery = TrinoMetadataDiscovery::new(engine);

        let tables = discovery.discover_tables("pg", "public").await.unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].schema_name, "public");

        let columns = discovery
            .discover_columns("pg", "public", "users")
            .await
            .unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "id");
        assert_eq!(columns[0].data_type, "bigint");
        assert_eq!(columns[1].table_name, "users");
    }

    #[tokio::test]
    async fn test_discover_propagates_engine_error() {
        let engine = Arc::new(StubEngine::new(vec![]));
        let discovery = TrinoMetadataDiscovery::new(engine);
        assert!(discovery.discover_catalogs().await.is_err());
    }
}
