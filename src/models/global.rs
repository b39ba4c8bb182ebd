use serde::{Deserialize, Serialize};

/// A logical table exposed to clients, abstracting one or more physical tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalTable {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A logical column of a global table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalColumn {
    #[serde(default)]
    pub global_table_name: String,
    pub name: String,
    #[serde(default)]
    pub data_type: String,
    #[serde(default)]
    pub description: String,
}
