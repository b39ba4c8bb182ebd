use thiserror::Error;

use crate::services::engine::EngineError;
use crate::storage::StoreError;

/// The SQL input was rejected by the restricted SELECT grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ParseError(pub String);

/// Failures while turning a global name into physical targets or physical
/// column names.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no table mappings or relations found for global table '{0}'")]
    NoMapping(String),

    #[error("no column mapping found for {0}")]
    NoColumnMapping(String),

    #[error("circular relation detected: relation '{0}' references itself")]
    CircularRelation(String),

    #[error("{0}")]
    InvalidRelation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures while emitting physical SQL from resolved components.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("nested relations are not supported in SQL generation")]
    NestedRelation,

    #[error("column '{0}' not found in column mapping")]
    UnmappedColumn(String),

    #[error("no tables provided for UNION")]
    EmptyUnion,

    #[error("mismatch between tables and column maps")]
    ColumnMapMismatch,

    #[error("JOIN relation requires join columns")]
    MissingJoinColumns,

    #[error("relation type '{actual}' not supported for {wanted} generation")]
    WrongRelationType {
        actual: &'static str,
        wanted: &'static str,
    },
}

/// Translator error, tagged with the stage that produced it.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("resolution error: {0}")]
    Resolution(#[from] ResolveError),

    #[error("column mapping error: {0}")]
    ColumnMapping(ResolveError),

    #[error("SQL generation error: {0}")]
    Generation(#[from] GenerateError),

    #[error("execution error: {0}")]
    Execution(#[from] EngineError),
}
