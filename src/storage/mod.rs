pub mod memory;

pub use memory::MemoryMetadataStore;

use thiserror::Error;

use crate::models::{
    Catalog, Column, ColumnMapping, GlobalColumn, GlobalTable, Schema, Table, TableMapping,
    TableRelation,
};

/// Store failures. Every public store operation is atomic; on error the
/// store is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0} '{1}' not found")]
    NotFound(&'static str, String),

    #[error("{0} '{1}' already exists")]
    AlreadyExists(&'static str, String),

    /// A child was created or upserted while its parent is absent.
    #[error("{0} '{1}' not found")]
    ParentMissing(&'static str, String),

    /// The same physical tuple was mapped twice to the same global key.
    #[error("duplicate {0} for '{1}'")]
    Duplicate(&'static str, String),
}

/// Metadata storage abstraction: the physical catalog hierarchy discovered
/// from the executor plus the user-authored global schema overlay.
///
/// All operations are synchronous and lock-based; none perform I/O. List
/// operations return snapshot copies with unspecified order.
pub trait MetadataStorage: Send + Sync {
    // Catalog operations
    fn create_catalog(&self, catalog: Catalog) -> Result<(), StoreError>;
    fn update_catalog(&self, catalog: Catalog) -> Result<(), StoreError>;
    fn upsert_catalog(&self, catalog: Catalog) -> Result<(), StoreError>;
    fn get_catalog(&self, name: &str) -> Result<Catalog, StoreError>;
    fn list_catalogs(&self) -> Vec<Catalog>;

    // Schema operations
    fn create_schema(&self, schema: Schema) -> Result<(), StoreError>;
    fn update_schema(&self, schema: Schema) -> Result<(), StoreError>;
    fn upsert_schema(&self, schema: Schema) -> Result<(), StoreError>;
    fn get_schema(&self, catalog: &str, name: &str) -> Result<Schema, StoreError>;
    fn list_schemas(&self, catalog: &str) -> Vec<Schema>;

    // Table operations
    fn create_table(&self, table: Table) -> Result<(), StoreError>;
    fn update_table(&self, table: Table) -> Result<(), StoreError>;
    fn upsert_table(&self, table: Table) -> Result<(), StoreError>;
    fn get_table(&self, catalog: &str, schema: &str, name: &str) -> Result<Table, StoreError>;
    fn list_tables(&self, catalog: &str, schema: &str) -> Vec<Table>;

    // Column operations
    fn create_column(&self, column: Column) -> Result<(), StoreError>;
    fn update_column(&self, column: Column) -> Result<(), StoreError>;
    fn upsert_column(&self, column: Column) -> Result<(), StoreError>;
    fn get_column(
        &self,
        catalog: &str,
        schema: &str,
        table: &str,
        name: &str,
    ) -> Result<Column, StoreError>;
    fn list_columns(&self, catalog: &str, schema: &str, table: &str) -> Vec<Column>;

    // Global table operations
    fn create_global_table(&self, table: GlobalTable) -> Result<(), StoreError>;
    fn get_global_table(&self, name: &str) -> Result<GlobalTable, StoreError>;
    fn list_global_tables(&self) -> Vec<GlobalTable>;
    /// Deletes the global table and everything hanging off it: its global
    /// columns, table mappings, column mappings, and relations bearing its name.
    fn delete_global_table(&self, name: &str) -> Result<(), StoreError>;

    // Global column operations
    fn create_global_column(&self, column: GlobalColumn) -> Result<(), StoreError>;
    fn list_global_columns(&self, global_table: &str) -> Vec<GlobalColumn>;
    fn delete_global_column(&self, global_table: &str, name: &str) -> Result<(), StoreError>;

    // Table mapping operations
    fn create_table_mapping(&self, mapping: TableMapping) -> Result<(), StoreError>;
    fn list_table_mappings(&self, global_table: &str) -> Vec<TableMapping>;
    fn delete_table_mapping(
        &self,
        global_table: &str,
        catalog: &str,
        schema: &str,
        table: &str,
    ) -> Result<(), StoreError>;

    // Column mapping operations
    fn create_column_mapping(&self, mapping: ColumnMapping) -> Result<(), StoreError>;
    fn list_column_mappings(&self, global_table: &str, global_column: &str) -> Vec<ColumnMapping>;
    #[allow(clippy::too_many_arguments)]
    fn delete_column_mapping(
        &self,
        global_table: &str,
        global_column: &str,
        catalog: &str,
        schema: &str,
        table: &str,
        column: &str,
    ) -> Result<(), StoreError>;

    // Table relation operations
    fn create_table_relation(&self, relation: TableRelation) -> Result<(), StoreError>;
    fn get_table_relation(&self, id: &str) -> Result<TableRelation, StoreError>;
    fn list_table_relations(&self) -> Vec<TableRelation>;
    fn delete_table_relation(&self, id: &str) -> Result<(), StoreError>;
}
