pub mod column_mapper;
pub mod error;
pub mod generator;
pub mod parser;
pub mod relation;
pub mod resolver;
pub mod translator;

pub use column_mapper::{ColumnMap, ColumnMapper};
pub use error::{GenerateError, ParseError, QueryError, ResolveError};
pub use generator::SqlGenerator;
pub use parser::{ParsedQuery, QueryParser};
pub use relation::{RelationNode, RelationResolver, ResolvedRelation};
pub use resolver::{ResolvedTableSource, TableResolver};
pub use translator::{GlobalQueryResult, Translator};
