use std::sync::Arc;
use tracing::{info, warn};

use crate::services::discovery::MetadataDiscovery;
use crate::services::engine::EngineError;
use crate::storage::MetadataStorage;

/// Pull-based reconciler: walks discovery level by level and upserts what it
/// finds into the store. Global-schema state is never touched, so re-syncing
/// preserves everything a user has authored.
///
/// Per-entity failures are logged and skipped; only a failure to discover the
/// catalog list itself aborts a full sync. Running a sync twice against the
/// same executor contents leaves the store unchanged.
pub struct MetadataSync {
    discovery: Arc<dyn MetadataDiscovery>,
    storage: Arc<dyn MetadataStorage>,
}

impl MetadataSync {
    pub fn new(discovery: Arc<dyn MetadataDiscovery>, storage: Arc<dyn MetadataStorage>) -> Self {
        Self { discovery, storage }
    }

    pub async fn sync_catalogs(&self) -> Result<(), EngineError> {
        let catalogs = self.discovery.discover_catalogs().await?;
        for catalog in catalogs {
            let name = catalog.name.clone();
            if let Err(e) = self.storage.upsert_catalog(catalog) {
                warn!("failed to upsert catalog '{}': {}", name, e);
            }
        }
        Ok(())
    }

    pub async fn sync_schemas(&self, catalog: &str) -> Result<(), EngineError> {
        let schemas = self.discovery.discover_schemas(catalog).await?;
        for schema in schemas {
            let name = schema.name.clone();
            if let Err(e) = self.storage.upsert_schema(schema) {
                warn!("failed to upsert schema '{}.{}': {}", catalog, name, e);
            }
        }
        Ok(())
    }

    pub async fn sync_tables(&self, catalog: &str, schema: &str) -> Result<(), EngineError> {
        let tables = self.discovery.discover_tables(catalog, schema).await?;
        for table in tables {
            let name = table.name.clone();
            if let Err(e) = self.storage.upsert_table(table) {
                warn!(
                    "failed to upsert table '{}.{}.{}': {}",
                    catalog, schema, name, e
                );
            }
        }
        Ok(())
    }

    pub async fn sync_columns(
        &self,
        catalog: &str,
        schema: &str,
        table: &str,
    ) -> Result<(), EngineError> {
        let columns = self.discovery.discover_columns(catalog, schema, table).await?;
        for column in columns {
            let name = column.name.clone();
            if let Err(e) = self.storage.upsert_column(column) {
                warn!(
                    "failed to upsert column '{}.{}.{}.{}': {}",
                    catalog, schema, table, name, e
                );
            }
        }
        Ok(())
    }

    /// Full reconciliation: catalogs first, then per catalog its schemas,
    /// per schema its tables, per table its columns. Stale entities that the
    /// executor no longer reports are left in place.
    pub async fn sync_all(&self) -> Result<(), EngineError> {
        self.sync_catalogs().await?;

        let catalogs = self.storage.list_catalogs();
        for catalog in &catalogs {
            if let Err(e) = self.sync_schemas(&catalog.name).await {
                warn!("failed to sync schemas for catalog '{}': {}", catalog.name, e);
                continue;
            }
            for schema in self.storage.list_schemas(&catalog.name) {
                if let Err(e) = self.sync_tables(&catalog.name, &schema.name).await {
                    warn!(
                        "failed to sync tables for schema '{}.{}': {}",
                        catalog.name, schema.name, e
                    );
                    continue;
                }
                for table in self.storage.list_tables(&catalog.name, &schema.name) {
                    if let Err(e) = self
                        .sync_columns(&catalog.name, &schema.name, &table.name)
                        .await
                    {
                        warn!(
                            "failed to sync columns for table '{}.{}.{}': {}",
                            catalog.name, schema.name, table.name, e
                        );
                    }
                }
            }
        }

        info!("full sync completed: {} catalogs synced", catalogs.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Catalog, Column, GlobalColumn, GlobalTable, Schema, Table, TableMapping};
    use crate::storage::MemoryMetadataStore;
    use async_trait::async_trait;

    /// Discovery stub reporting a fixed topology, with optional per-level
    /// failures.
    struct StubDiscovery {
        catalogs: Vec<&'static str>,
        fail_catalogs: bool,
        fail_schemas_for: Option<&'static str>,
    }

    impl StubDiscovery {
        fn healthy() -> Self {
            Self {
                catalogs: vec!["pg", "mysql"],
                fail_catalogs: false,
                fail_schemas_for: None,
            }
        }
    }

    #[async_trait]
    impl MetadataDiscovery for StubDiscovery {
        async fn discover_catalogs(&self) -> Result<Vec<Catalog>, EngineError> {
            if self.fail_catalogs {
                return Err(EngineError::Transport("executor unreachable".to_string()));
            }
            Ok(self.catalogs.iter().map(|c| Catalog::new(*c)).collect())
        }

        async fn discover_schemas(&self, catalog: &str) -> Result<Vec<Schema>, EngineError> {
            if self.fail_schemas_for == Some(catalog) {
                return Err(EngineError::Query("SHOW SCHEMAS failed".to_string()));
            }
            Ok(vec![Schema::new(catalog, "public")])
        }

        async fn discover_tables(
            &self,
            catalog: &str,
            schema: &str,
        ) -> Result<Vec<Table>, EngineError> {
            Ok(vec![Table::new(catalog, schema, "users")])
        }

        async fn discover_columns(
            &self,
            catalog: &str,
            schema: &str,
            table: &str,
        ) -> Result<Vec<Column>, EngineError> {
            Ok(vec![
                Column::new(catalog, schema, table, "id", "bigint"),
                Column::new(catalog, schema, table, "name", "varchar"),
            ])
        }
    }

    fn snapshot(store: &MemoryMetadataStore) -> (usize, usize, usize, usize) {
        let catalogs = store.list_catalogs();
        let mut schemas = 0;
        let mut tables = 0;
        let mut columns = 0;
        for catalog in &catalogs {
            for schema in store.list_schemas(&catalog.name) {
                schemas += 1;
                for table in store.list_tables(&catalog.name, &schema.name) {
                    tables += 1;
                    columns += store
                        .list_columns(&catalog.name, &schema.name, &table.name)
                        .len();
                }
            }
        }
        (catalogs.len(), schemas, tables, columns)
    }

    #[tokio::test]
    async fn test_sync_all_walks_the_full_hierarchy() {
        let store = Arc::new(MemoryMetadataStore::new());
        let sync = MetadataSync::new(Arc::new(StubDiscovery::healthy()), store.clone());

        sync.sync_all().await.unwrap();
        assert_eq!(snapshot(&store), (2, 2, 2, 4));
        assert_eq!(
            store
                .get_column("pg", "public", "users", "id")
                .unwrap()
                .data_type,
            "bigint"
        );
    }

    #[tokio::test]
    async fn test_sync_all_is_idempotent() {
        let store = Arc::new(MemoryMetadataStore::new());
        let sync = MetadataSync::new(Arc::new(StubDiscovery::healthy()), store.clone());

        sync.sync_all().await.unwrap();
        let before = snapshot(&store);
        sync.sync_all().await.unwrap();
        assert_eq!(snapshot(&store), before);
    }

    #[tokio::test]
    async fn test_sync_preserves_global_overlay() {
        let store = Arc::new(MemoryMetadataStore::new());
        store
            .create_global_table(GlobalTable {
                name: "customers".to_string(),
                description: "authored by a user".to_string(),
            })
            .unwrap();
        store
            .create_global_column(GlobalColumn {
                global_table_name: "customers".to_string(),
                name: "id".to_string(),
                data_type: "bigint".to_string(),
                description: String::new(),
            })
            .unwrap();
        store
            .create_table_mapping(TableMapping {
                global_table_name: "customers".to_string(),
                catalog_name: "gone".to_string(),
                schema_name: "old".to_string(),
                table_name: "customers".to_string(),
            })
            .unwrap();

        let sync = MetadataSync::new(Arc::new(StubDiscovery::healthy()), store.clone());
        sync.sync_all().await.unwrap();

        // The overlay survives even where it references tables the executor
        // no longer reports.
        assert_eq!(store.list_global_tables().len(), 1);
        assert_eq!(store.list_global_columns("customers").len(), 1);
        assert_eq!(store.list_table_mappings("customers").len(), 1);
    }

    #[tokio::test]
    async fn test_sync_continues_past_per_catalog_failures() {
        let store = Arc::new(MemoryMetadataStore::new());
        let discovery = StubDiscovery {
            catalogs: vec!["pg", "mysql"],
            fail_catalogs: false,
            fail_schemas_for: Some("pg"),
        };
        let sync = MetadataSync::new(Arc::new(discovery), store.clone());

        sync.sync_all().await.unwrap();
        assert!(store.list_schemas("pg").is_empty());
        assert_eq!(store.list_schemas("mysql").len(), 1);
    }

    #[tokio::test]
    async fn test_sync_all_aborts_when_catalog_discovery_fails() {
        let store = Arc::new(MemoryMetadataStore::new());
        let discovery = StubDiscovery {
            catalogs: vec![],
            fail_catalogs: true,
            fail_schemas_for: None,
        };
        let sync = MetadataSync::new(Arc::new(discovery), store.clone());

        assert!(sync.sync_all().await.is_err());
        assert!(store.list_catalogs().is_empty());
    }
}
