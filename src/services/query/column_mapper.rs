use std::collections::HashMap;
use std::sync::Arc;

use crate::models::TableMapping;
use crate::services::query::error::ResolveError;
use crate::services::query::relation::ResolvedRelation;
use crate::storage::MetadataStorage;

/// Mapping of requested global column names to the physical column names of
/// one target table.
pub type ColumnMap = HashMap<String, String>;

/// Maps global columns to physical columns by consulting the column-mapping
/// store and selecting, per column, the row whose physical table matches the
/// target.
pub struct ColumnMapper {
    storage: Arc<dyn MetadataStorage>,
}

impl ColumnMapper {
    pub fn new(storage: Arc<dyn MetadataStorage>) -> Self {
        Self { storage }
    }

    /// All global column names of a global table, for the `SELECT *` path.
    pub fn all_columns(&self, global_table: &str) -> Vec<String> {
        self.storage
            .list_global_columns(global_table)
            .into_iter()
            .map(|c| c.name)
            .collect()
    }

    pub fn map_columns(
        &self,
        global_table: &str,
        global_columns: &[String],
        target: &TableMapping,
    ) -> Result<ColumnMap, ResolveError> {
        let mut column_map = ColumnMap::new();
        for global_column in global_columns {
            let physical = self.map_single_column(global_table, global_column, target)?;
            column_map.insert(global_column.clone(), physical);
        }
        Ok(column_map)
    }

    fn map_single_column(
        &self,
        global_table: &str,
        global_column: &str,
        target: &TableMapping,
    ) -> Result<String, ResolveError> {
        let mappings = self.storage.list_column_mappings(global_table, global_column);
        if mappings.is_empty() {
            return Err(ResolveError::NoColumnMapping(format!(
                "'{global_table}.{global_column}'"
            )));
        }

        mappings
            .into_iter()
            .find(|m| {
                m.catalog_name == target.catalog_name
                    && m.schema_name == target.schema_name
                    && m.table_name == target.table_name
            })
            .map(|m| m.column_name)
            .ok_or_else(|| {
                ResolveError::NoColumnMapping(format!(
                    "'{global_table}.{global_column}' in physical table '{}'",
                    target.qualified_name()
                ))
            })
    }

    /// Repeats the mapping per target, producing one `ColumnMap` per table.
    /// Used for the auto-UNION path.
    pub fn map_columns_for_tables(
        &self,
        global_table: &str,
        global_columns: &[String],
        targets: &[TableMapping],
    ) -> Result<Vec<ColumnMap>, ResolveError> {
        targets
            .iter()
            .map(|target| self.map_columns(global_table, global_columns, target))
            .collect()
    }

    /// Maps columns for both arms of a resolved relation. Only relations
    /// whose arms are physical leaves can be mapped.
    pub fn map_columns_for_relation(
        &self,
        global_table: &str,
        global_columns: &[String],
        relation: &ResolvedRelation,
    ) -> Result<Vec<ColumnMap>, ResolveError> {
        let targets: Vec<TableMapping> = [&relation.left, &relation.right]
            .into_iter()
            .map(|node| {
                node.as_mapping(global_table).ok_or_else(|| {
                    ResolveError::InvalidRelation(
                        "nested relations are not supported in column mapping".to_string(),
                    )
                })
            })
            .collect::<Result<_, _>>()?;
        self.map_columns_for_tables(global_table, global_columns, &targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnMapping, GlobalColumn, GlobalTable};
    use crate::storage::MemoryMetadataStore;

    fn target(table: &str) -> TableMapping {
        TableMapping {
            global_table_name: "customers".to_string(),
            catalog_name: "pg".to_string(),
            schema_name: "public".to_string(),
            table_name: table.to_string(),
        }
    }

    fn seeded_store() -> Arc<MemoryMetadataStore> {
        let store = Arc::new(MemoryMetadataStore::new());
        store
            .create_global_table(GlobalTable {
                name: "customers".to_string(),
                description: String::new(),
            })
            .unwrap();
        for name in ["id", "name"] {
            store
                .create_global_column(GlobalColumn {
                    global_table_name: "customers".to_string(),
                    name: name.to_string(),
                    data_type: "varchar".to_string(),
                    description: String::new(),
                })
                .unwrap();
            store
                .create_column_mapping(ColumnMapping {
                    global_table_name: "customers".to_string(),
                    global_column_name: name.to_string(),
                    catalog_name: "pg".to_string(),
                    schema_name: "public".to_string(),
                    table_name: "customers_a".to_string(),
                    column_name: format!("a_{name}"),
                })
                .unwrap();
        }
        store
    }

    #[test]
    fn test_map_columns_selects_matching_target() {
        let store = seeded_store();
        let mapper = ColumnMapper::new(store);
        let map = mapper
            .map_columns(
                "customers",
                &["id".to_string(), "name".to_string()],
                &target("customers_a"),
            )
            .unwrap();
        assert_eq!(map["id"], "a_id");
        assert_eq!(map["name"], "a_name");
    }

    #[test]
    fn test_map_columns_unknown_column() {
        let store = seeded_store();
        let mapper = ColumnMapper::new(store);
        let err = mapper
            .map_columns("customers", &["missing".to_string()], &target("customers_a"))
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoColumnMapping(_)));
    }

    #[test]
    fn test_map_columns_wrong_target_table() {
        let store = seeded_store();
        let mapper = ColumnMapper::new(store);
        let err = mapper
            .map_columns("customers", &["id".to_string()], &target("customers_b"))
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoColumnMapping(_)));
    }

    #[test]
    fn test_all_columns_lists_global_columns() {
        let store = seeded_store();
        let mapper = ColumnMapper::new(store);
        assert_eq!(mapper.all_columns("customers"), vec!["id", "name"]);
        assert!(mapper.all_columns("unknown").is_empty());
    }
}
