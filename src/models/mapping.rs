use serde::{Deserialize, Serialize};

/// Binds one physical table to a global table. A global table may carry any
/// number of these; each physical triple appears at most once per global table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMapping {
    #[serde(default)]
    pub global_table_name: String,
    pub catalog_name: String,
    pub schema_name: String,
    pub table_name: String,
}

impl TableMapping {
    /// The fully qualified physical identifier, `catalog.schema.table`.
    pub fn qualified_name(&self) -> String {
        format!(
            "{}.{}.{}",
            self.catalog_name, self.schema_name, self.table_name
        )
    }
}

/// Binds one physical column to a global column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    #[serde(default)]
    pub global_table_name: String,
    #[serde(default)]
    pub global_column_name: String,
    pub catalog_name: String,
    pub schema_name: String,
    pub table_name: String,
    pub column_name: String,
}
