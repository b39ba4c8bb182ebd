use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::{
    Catalog, Column, ColumnMapping, GlobalColumn, GlobalTable, RelationType, Schema, Table,
    TableMapping, TableRelation,
};
use crate::storage::{MetadataStorage, StoreError};

/// In-memory metadata store. A single reader-writer lock guards all state:
/// reads take the shared mode, writes the exclusive mode, so every public
/// operation is atomic and a failed precondition leaves nothing mutated.
///
/// The store is volatile and process-local. Mappings are kept as ordered
/// sequences per global key; duplicate detection is linear in the sequence
/// length, which stays small in practice.
pub struct MemoryMetadataStore {
    inner: RwLock<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    catalogs: HashMap<String, Catalog>,
    /// catalog name -> schema name -> schema
    schemas: HashMap<String, HashMap<String, Schema>>,
    /// (catalog, schema) -> table name -> table
    tables: HashMap<(String, String), HashMap<String, Table>>,
    /// (catalog, schema, table) -> column name -> column
    columns: HashMap<(String, String, String), HashMap<String, Column>>,

    global_tables: HashMap<String, GlobalTable>,
    /// global table name -> columns, in creation order
    global_columns: HashMap<String, Vec<GlobalColumn>>,
    /// global table name -> mappings, in creation order
    table_mappings: HashMap<String, Vec<TableMapping>>,
    /// (global table, global column) -> mappings, in creation order
    column_mappings: HashMap<(String, String), Vec<ColumnMapping>>,

    /// Relations in creation order; ids and names are unique.
    relations: Vec<TableRelation>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap()
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap()
    }
}

impl Default for MemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

fn require_name(kind: &'static str, name: &str) -> Result<(), StoreError> {
    if name.is_empty() {
        return Err(StoreError::InvalidArgument(format!(
            "{kind} name must not be empty"
        )));
    }
    Ok(())
}

impl StoreInner {
    fn require_catalog(&self, name: &str) -> Result<(), StoreError> {
        if !self.catalogs.contains_key(name) {
            return Err(StoreError::ParentMissing("catalog", name.to_string()));
        }
        Ok(())
    }

    fn require_schema(&self, catalog: &str, schema: &str) -> Result<(), StoreError> {
        let present = self
            .schemas
            .get(catalog)
            .is_some_and(|s| s.contains_key(schema));
        if !present {
            return Err(StoreError::ParentMissing(
                "schema",
                format!("{catalog}.{schema}"),
            ));
        }
        Ok(())
    }

    fn require_table(&self, catalog: &str, schema: &str, table: &str) -> Result<(), StoreError> {
        let key = (catalog.to_string(), schema.to_string());
        if !self.tables.get(&key).is_some_and(|t| t.contains_key(table)) {
            return Err(StoreError::ParentMissing(
                "table",
                format!("{catalog}.{schema}.{table}"),
            ));
        }
        Ok(())
    }

    fn require_global_table(&self, name: &str) -> Result<(), StoreError> {
        if !self.global_tables.contains_key(name) {
            return Err(StoreError::ParentMissing("global table", name.to_string()));
        }
        Ok(())
    }

    fn require_global_column(&self, table: &str, column: &str) -> Result<(), StoreError> {
        let present = self
            .global_columns
            .get(table)
            .is_some_and(|cols| cols.iter().any(|c| c.name == column));
        if !present {
            return Err(StoreError::ParentMissing(
                "global column",
                format!("{table}.{column}"),
            ));
        }
        Ok(())
    }
}

impl MetadataStorage for MemoryMetadataStore {
    // ------------------------------------------------------------------
    // Catalogs
    // ------------------------------------------------------------------

    fn create_catalog(&self, catalog: Catalog) -> Result<(), StoreError> {
        require_name("catalog", &catalog.name)?;
        let mut inner = self.write();
        if inner.catalogs.contains_key(&catalog.name) {
            return Err(StoreError::AlreadyExists("catalog", catalog.name));
        }
        inner.catalogs.insert(catalog.name.clone(), catalog);
        Ok(())
    }

    fn update_catalog(&self, catalog: Catalog) -> Result<(), StoreError> {
        require_name("catalog", &catalog.name)?;
        let mut inner = self.write();
        if !inner.catalogs.contains_key(&catalog.name) {
            return Err(StoreError::NotFound("catalog", catalog.name));
        }
        inner.catalogs.insert(catalog.name.clone(), catalog);
        Ok(())
    }

    fn upsert_catalog(&self, catalog: Catalog) -> Result<(), StoreError> {
        require_name("catalog", &catalog.name)?;
        let mut inner = self.write();
        inner.catalogs.insert(catalog.name.clone(), catalog);
        Ok(())
    }

    fn get_catalog(&self, name: &str) -> Result<Catalog, StoreError> {
        self.read()
            .catalogs
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("catalog", name.to_string()))
    }

    fn list_catalogs(&self) -> Vec<Catalog> {
        self.read().catalogs.values().cloned().collect()
    }

    // ------------------------------------------------------------------
    // Schemas
    // ------------------------------------------------------------------

    fn create_schema(&self, schema: Schema) -> Result<(), StoreError> {
        require_name("schema", &schema.name)?;
        let mut inner = self.write();
        inner.require_catalog(&schema.catalog_name)?;
        let per_catalog = inner
            .schemas
            .entry(schema.catalog_name.clone())
            .or_default();
        if per_catalog.contains_key(&schema.name) {
            return Err(StoreError::AlreadyExists(
                "schema",
                format!("{}.{}", schema.catalog_name, schema.name),
            ));
        }
        per_catalog.insert(schema.name.clone(), schema);
        Ok(())
    }

    fn update_schema(&self, schema: Schema) -> Result<(), StoreError> {
        require_name("schema", &schema.name)?;
        let mut inner = self.write();
        let slot = inner
            .schemas
            .get_mut(&schema.catalog_name)
            .and_then(|s| s.get_mut(&schema.name))
            .ok_or_else(|| {
                StoreError::NotFound(
                    "schema",
                    format!("{}.{}", schema.catalog_name, schema.name),
                )
            })?;
        *slot = schema;
        Ok(())
    }

    fn upsert_schema(&self, schema: Schema) -> Result<(), StoreError> {
        require_name("schema", &schema.name)?;
        let mut inner = self.write();
        inner.require_catalog(&schema.catalog_name)?;
        inner
            .schemas
            .entry(schema.catalog_name.clone())
            .or_default()
            .insert(schema.name.clone(), schema);
        Ok(())
    }

    fn get_schema(&self, catalog: &str, name: &str) -> Result<Schema, StoreError> {
        self.read()
            .schemas
            .get(catalog)
            .and_then(|s| s.get(name))
            .cloned()
            .ok_or_else(|| StoreError::NotFound("schema", format!("{catalog}.{name}")))
    }

    fn list_schemas(&self, catalog: &str) -> Vec<Schema> {
        self.read()
            .schemas
            .get(catalog)
            .map(|s| s.values().cloned().collect())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Tables
    // ------------------------------------------------------------------

    fn create_table(&self, table: Table) -> Result<(), StoreError> {
        require_name("table", &table.name)?;
        let mut inner = self.write();
        inner.require_schema(&table.catalog_name, &table.schema_name)?;
        let key = (table.catalog_name.clone(), table.schema_name.clone());
        let per_schema = inner.tables.entry(key).or_default();
        if per_schema.contains_key(&table.name) {
            return Err(StoreError::AlreadyExists(
                "table",
                format!(
                    "{}.{}.{}",
                    table.catalog_name, table.schema_name, table.name
                ),
            ));
        }
        per_schema.insert(table.name.clone(), table);
        Ok(())
    }

    fn update_table(&self, table: Table) -> Result<(), StoreError> {
        require_name("table", &table.name)?;
        let mut inner = self.write();
        let key = (table.catalog_name.clone(), table.schema_name.clone());
        let slot = inner
            .tables
            .get_mut(&key)
            .and_then(|t| t.get_mut(&table.name))
            .ok_or_else(|| {
                StoreError::NotFound(
                    "table",
                    format!(
                        "{}.{}.{}",
                        table.catalog_name, table.schema_name, table.name
                    ),
                )
            })?;
        *slot = table;
        Ok(())
    }

    fn upsert_table(&self, table: Table) -> Result<(), StoreError> {
        require_name("table", &table.name)?;
        let mut inner = self.write();
        inner.require_schema(&table.catalog_name, &table.schema_name)?;
        let key = (table.catalog_name.clone(), table.schema_name.clone());
        inner
            .tables
            .entry(key)
            .or_default()
            .insert(table.name.clone(), table);
        Ok(())
    }

    fn get_table(&self, catalog: &str, schema: &str, name: &str) -> Result<Table, StoreError> {
        let key = (catalog.to_string(), schema.to_string());
        self.read()
            .tables
            .get(&key)
            .and_then(|t| t.get(name))
            .cloned()
            .ok_or_else(|| StoreError::NotFound("table", format!("{catalog}.{schema}.{name}")))
    }

    fn list_tables(&self, catalog: &str, schema: &str) -> Vec<Table> {
        let key = (catalog.to_string(), schema.to_string());
        self.read()
            .tables
            .get(&key)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------

    fn create_column(&self, column: Column) -> Result<(), StoreError> {
        require_name("column", &column.name)?;
        let mut inner = self.write();
        inner.require_table(
            &column.catalog_name,
            &column.schema_name,
            &column.table_name,
        )?;
        let key = (
            column.catalog_name.clone(),
            column.schema_name.clone(),
            column.table_name.clone(),
        );
        let per_table = inner.columns.entry(key).or_default();
        if per_table.contains_key(&column.name) {
            return Err(StoreError::AlreadyExists(
                "column",
                format!(
                    "{}.{}.{}.{}",
                    column.catalog_name, column.schema_name, column.table_name, column.name
                ),
            ));
        }
        per_table.insert(column.name.clone(), column);
        Ok(())
    }

    fn update_column(&self, column: Column) -> Result<(), StoreError> {
        require_name("column", &column.name)?;
        let mut inner = self.write();
        let key = (
            column.catalog_name.clone(),
            column.schema_name.clone(),
            column.table_name.clone(),
        );
        let slot = inner
            .columns
            .get_mut(&key)
            .and_then(|c| c.get_mut(&column.name))
            .ok_or_else(|| {
                StoreError::NotFound(
                    "column",
                    format!(
                        "{}.{}.{}.{}",
                        column.catalog_name, column.schema_name, column.table_name, column.name
                    ),
                )
            })?;
        *slot = column;
        Ok(())
    }

    fn upsert_column(&self, column: Column) -> Result<(), StoreError> {
        require_name("column", &column.name)?;
        let mut inner = self.write();
        inner.require_table(
            &column.catalog_name,
            &column.schema_name,
            &column.table_name,
        )?;
        let key = (
            column.catalog_name.clone(),
            column.schema_name.clone(),
            column.table_name.clone(),
        );
        inner
            .columns
            .entry(key)
            .or_default()
            .insert(column.name.clone(), column);
        Ok(())
    }

    fn get_column(
        &self,
        catalog: &str,
        schema: &str,
        table: &str,
        name: &str,
    ) -> Result<Column, StoreError> {
        let key = (catalog.to_string(), schema.to_string(), table.to_string());
        self.read()
            .columns
            .get(&key)
            .and_then(|c| c.get(name))
            .cloned()
            .ok_or_else(|| {
                StoreError::NotFound("column", format!("{catalog}.{schema}.{table}.{name}"))
            })
    }

    fn list_columns(&self, catalog: &str, schema: &str, table: &str) -> Vec<Column> {
        let key = (catalog.to_string(), schema.to_string(), table.to_string());
        self.read()
            .columns
            .get(&key)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Global tables
    // ------------------------------------------------------------------

    fn create_global_table(&self, table: GlobalTable) -> Result<(), StoreError> {
        require_name("global table", &table.name)?;
        let mut inner = self.write();
        if inner.global_tables.contains_key(&table.name) {
            return Err(StoreError::AlreadyExists("global table", table.name));
        }
        inner.global_tables.insert(table.name.clone(), table);
        Ok(())
    }

    fn get_global_table(&self, name: &str) -> Result<GlobalTable, StoreError> {
        self.read()
            .global_tables
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("global table", name.to_string()))
    }

    fn list_global_tables(&self) -> Vec<GlobalTable> {
        self.read().global_tables.values().cloned().collect()
    }

    fn delete_global_table(&self, name: &str) -> Result<(), StoreError> {
        let mut inner = self.write();
        if inner.global_tables.remove(name).is_none() {
            return Err(StoreError::NotFound("global table", name.to_string()));
        }
        inner.global_columns.remove(name);
        inner.table_mappings.remove(name);
        inner.column_mappings.retain(|(table, _), _| table != name);
        inner.relations.retain(|r| r.name != name);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Global columns
    // ------------------------------------------------------------------

    fn create_global_column(&self, column: GlobalColumn) -> Result<(), StoreError> {
        require_name("global column", &column.name)?;
        let mut inner = self.write();
        inner.require_global_table(&column.global_table_name)?;
        let columns = inner
            .global_columns
            .entry(column.global_table_name.clone())
            .or_default();
        if columns.iter().any(|c| c.name == column.name) {
            return Err(StoreError::AlreadyExists(
                "global column",
                format!("{}.{}", column.global_table_name, column.name),
            ));
        }
        columns.push(column);
        Ok(())
    }

    fn list_global_columns(&self, global_table: &str) -> Vec<GlobalColumn> {
        self.read()
            .global_columns
            .get(global_table)
            .cloned()
            .unwrap_or_default()
    }

    fn delete_global_column(&self, global_table: &str, name: &str) -> Result<(), StoreError> {
        let mut inner = self.write();
        let columns = inner
            .global_columns
            .get_mut(global_table)
            .ok_or_else(|| {
                StoreError::NotFound("global column", format!("{global_table}.{name}"))
            })?;
        let idx = columns.iter().position(|c| c.name == name).ok_or_else(|| {
            StoreError::NotFound("global column", format!("{global_table}.{name}"))
        })?;
        columns.remove(idx);
        // A column mapping requires its global column; drop the orphans too.
        inner
            .column_mappings
            .remove(&(global_table.to_string(), name.to_string()));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Table mappings
    // ------------------------------------------------------------------

    fn create_table_mapping(&self, mapping: TableMapping) -> Result<(), StoreError> {
        require_name("global table", &mapping.global_table_name)?;
        let mut inner = self.write();
        inner.require_global_table(&mapping.global_table_name)?;
        let mappings = inner
            .table_mappings
            .entry(mapping.global_table_name.clone())
            .or_default();
        let duplicate = mappings.iter().any(|m| {
            m.catalog_name == mapping.catalog_name
                && m.schema_name == mapping.schema_name
                && m.table_name == mapping.table_name
        });
        if duplicate {
            return Err(StoreError::Duplicate(
                "table mapping",
                mapping.qualified_name(),
            ));
        }
        mappings.push(mapping);
        Ok(())
    }

    fn list_table_mappings(&self, global_table: &str) -> Vec<TableMapping> {
        self.read()
            .table_mappings
            .get(global_table)
            .cloned()
            .unwrap_or_default()
    }

    fn delete_table_mapping(
        &self,
        global_table: &str,
        catalog: &str,
        schema: &str,
        table: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.write();
        let mappings = inner.table_mappings.get_mut(global_table).ok_or_else(|| {
            StoreError::NotFound("table mapping", format!("{catalog}.{schema}.{table}"))
        })?;
        let idx = mappings
            .iter()
            .position(|m| {
                m.catalog_name == catalog && m.schema_name == schema && m.table_name == table
            })
            .ok_or_else(|| {
                StoreError::NotFound("table mapping", format!("{catalog}.{schema}.{table}"))
            })?;
        mappings.remove(idx);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Column mappings
    // ------------------------------------------------------------------

    fn create_column_mapping(&self, mapping: ColumnMapping) -> Result<(), StoreError> {
        require_name("global column", &mapping.global_column_name)?;
        let mut inner = self.write();
        inner.require_global_column(&mapping.global_table_name, &mapping.global_column_name)?;
        let key = (
            mapping.global_table_name.clone(),
            mapping.global_column_name.clone(),
        );
        let mappings = inner.column_mappings.entry(key).or_default();
        let duplicate = mappings.iter().any(|m| {
            m.catalog_name == mapping.catalog_name
                && m.schema_name == mapping.schema_name
                && m.table_name == mapping.table_name
                && m.column_name == mapping.column_name
        });
        if duplicate {
            return Err(StoreError::Duplicate(
                "column mapping",
                format!(
                    "{}.{}.{}.{}",
                    mapping.catalog_name,
                    mapping.schema_name,
                    mapping.table_name,
                    mapping.column_name
                ),
            ));
        }
        mappings.push(mapping);
        Ok(())
    }

    fn list_column_mappings(&self, global_table: &str, global_column: &str) -> Vec<ColumnMapping> {
        let key = (global_table.to_string(), global_column.to_string());
        self.read()
            .column_mappings
            .get(&key)
            .cloned()
            .unwrap_or_default()
    }

    fn delete_column_mapping(
        &self,
        global_table: &str,
        global_column: &str,
        catalog: &str,
        schema: &str,
        table: &str,
        column: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.write();
        let key = (global_table.to_string(), global_column.to_string());
        let not_found =
            || StoreError::NotFound("column mapping", format!("{catalog}.{schema}.{table}.{column}"));
        let mappings = inner.column_mappings.get_mut(&key).ok_or_else(not_found)?;
        let idx = mappings
            .iter()
            .position(|m| {
                m.catalog_name == catalog
                    && m.schema_name == schema
                    && m.table_name == table
                    && m.column_name == column
            })
            .ok_or_else(not_found)?;
        mappings.remove(idx);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Table relations
    // ------------------------------------------------------------------

    fn create_table_relation(&self, relation: TableRelation) -> Result<(), StoreError> {
        if relation.id.is_empty() {
            return Err(StoreError::InvalidArgument(
                "relation id must not be empty".to_string(),
            ));
        }
        require_name("relation", &relation.name)?;
        if relation.relation_type == RelationType::Join {
            let valid = relation
                .join_column
                .as_ref()
                .is_some_and(|jc| !jc.left.is_empty() && !jc.right.is_empty());
            if !valid {
                return Err(StoreError::InvalidArgument(
                    "JOIN relation requires both left and right join columns".to_string(),
                ));
            }
        }
        let mut inner = self.write();
        if inner.relations.iter().any(|r| r.id == relation.id) {
            return Err(StoreError::AlreadyExists("relation", relation.id));
        }
        // Resolution picks the first relation whose name matches the queried
        // table; unique names keep that deterministic.
        if inner.relations.iter().any(|r| r.name == relation.name) {
            return Err(StoreError::AlreadyExists("relation", relation.name));
        }
        inner.relations.push(relation);
        Ok(())
    }

    fn get_table_relation(&self, id: &str) -> Result<TableRelation, StoreError> {
        self.read()
            .relations
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("relation", id.to_string()))
    }

    fn list_table_relations(&self) -> Vec<TableRelation> {
        self.read().relations.clone()
    }

    fn delete_table_relation(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.write();
        let idx = inner
            .relations
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound("relation", id.to_string()))?;
        inner.relations.remove(idx);
        Ok(())
    }
}
