use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A top-level data-source root reported by the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub name: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Catalog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: HashMap::new(),
        }
    }
}

/// A schema inside a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub catalog_name: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Schema {
    pub fn new(catalog_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catalog_name: catalog_name.into(),
            metadata: HashMap::new(),
        }
    }
}

/// A physical table inside a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub catalog_name: String,
    pub schema_name: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Table {
    pub fn new(
        catalog_name: impl Into<String>,
        schema_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            catalog_name: catalog_name.into(),
            schema_name: schema_name.into(),
            metadata: HashMap::new(),
        }
    }
}

/// A physical column inside a table, with its executor-reported type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub catalog_name: String,
    pub schema_name: String,
    pub table_name: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Column {
    pub fn new(
        catalog_name: impl Into<String>,
        schema_name: impl Into<String>,
        table_name: impl Into<String>,
        name: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            catalog_name: catalog_name.into(),
            schema_name: schema_name.into(),
            table_name: table_name.into(),
            metadata: HashMap::new(),
        }
    }
}
