use std::sync::Arc;

use crate::models::TableMapping;
use crate::services::query::error::ResolveError;
use crate::services::query::relation::{RelationResolver, ResolvedRelation};
use crate::storage::MetadataStorage;

/// Outcome of resolving a global table name to physical sources.
#[derive(Debug)]
pub enum ResolvedTableSource {
    /// Exactly one table mapping: plain pass-through.
    Single(TableMapping),
    /// Several table mappings: an implicit UNION over all of them.
    Multiple(Vec<TableMapping>),
    /// An explicit relation carries the queried name.
    Relation(ResolvedRelation),
}

/// Resolves the table named in a global query. A relation whose name matches
/// shadows any table mappings; with neither present the name does not map.
pub struct TableResolver {
    storage: Arc<dyn MetadataStorage>,
    relation_resolver: RelationResolver,
}

impl TableResolver {
    pub fn new(storage: Arc<dyn MetadataStorage>) -> Self {
        Self {
            relation_resolver: RelationResolver::new(storage.clone()),
            storage,
        }
    }

    pub fn resolve(&self, name: &str) -> Result<ResolvedTableSource, ResolveError> {
        for relation in self.storage.list_table_relations() {
            if relation.name == name {
                let resolved = self.relation_resolver.resolve(&relation.id)?;
                return Ok(ResolvedTableSource::Relation(resolved));
            }
        }

        let mut mappings = self.storage.list_table_mappings(name);
        match mappings.len() {
            0 => Err(ResolveError::NoMapping(name.to_string())),
            1 => Ok(ResolvedTableSource::Single(mappings.remove(0))),
            _ => Ok(ResolvedTableSource::Multiple(mappings)),
        }
    }
}
