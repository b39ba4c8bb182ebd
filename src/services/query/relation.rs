use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{JoinColumn, RelationType, TableMapping, TableRelation, TableSource};
use crate::services::query::error::ResolveError;
use crate::storage::MetadataStorage;

/// A resolved leaf or nested operator in a relation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationNode {
    Physical {
        catalog: String,
        schema: String,
        table: String,
    },
    Relation {
        id: String,
        relation_type: RelationType,
    },
}

impl RelationNode {
    pub fn is_physical(&self) -> bool {
        matches!(self, RelationNode::Physical { .. })
    }

    /// View of a physical node as a mapping target for the column mapper.
    pub fn as_mapping(&self, global_table: &str) -> Option<TableMapping> {
        match self {
            RelationNode::Physical {
                catalog,
                schema,
                table,
            } => Some(TableMapping {
                global_table_name: global_table.to_string(),
                catalog_name: catalog.clone(),
                schema_name: schema.clone(),
                table_name: table.clone(),
            }),
            RelationNode::Relation { .. } => None,
        }
    }
}

/// A relation with both sides resolved down to nodes.
#[derive(Debug, Clone)]
pub struct ResolvedRelation {
    pub id: String,
    pub name: String,
    pub relation_type: RelationType,
    pub left: RelationNode,
    pub right: RelationNode,
    pub join_column: Option<JoinColumn>,
}

/// Resolves stored relations, recursing through nested sources. A `visited`
/// set keyed by relation id travels with the recursion; revisiting an id
/// aborts with `CircularRelation`.
pub struct RelationResolver {
    storage: Arc<dyn MetadataStorage>,
}

impl RelationResolver {
    pub fn new(storage: Arc<dyn MetadataStorage>) -> Self {
        Self { storage }
    }

    pub fn resolve(&self, relation_id: &str) -> Result<ResolvedRelation, ResolveError> {
        let mut visited = HashSet::new();
        visited.insert(relation_id.to_string());
        self.resolve_with_visited(relation_id, &mut visited)
    }

    fn resolve_with_visited(
        &self,
        relation_id: &str,
        visited: &mut HashSet<String>,
    ) -> Result<ResolvedRelation, ResolveError> {
        let relation = self.storage.get_table_relation(relation_id)?;
        validate_join_columns(&relation)?;

        let left = self.resolve_source(&relation.left_table, visited)?;
        let right = self.resolve_source(&relation.right_table, visited)?;

        Ok(ResolvedRelation {
            id: relation.id,
            name: relation.name,
            relation_type: relation.relation_type,
            left,
            right,
            join_column: relation.join_column,
        })
    }

    fn resolve_source(
        &self,
        source: &TableSource,
        visited: &mut HashSet<String>,
    ) -> Result<RelationNode, ResolveError> {
        match source {
            TableSource::Physical {
                catalog,
                schema,
                table,
            } => Ok(RelationNode::Physical {
                catalog: catalog.clone(),
                schema: schema.clone(),
                table: table.clone(),
            }),
            TableSource::Relation { relation_id } => {
                if relation_id.is_empty() {
                    return Err(ResolveError::InvalidRelation(
                        "relation source requires a relation id".to_string(),
                    ));
                }
                if !visited.insert(relation_id.clone()) {
                    return Err(ResolveError::CircularRelation(relation_id.clone()));
                }
                let nested = self.resolve_with_visited(relation_id, visited)?;
                Ok(RelationNode::Relation {
                    id: nested.id,
                    relation_type: nested.relation_type,
                })
            }
        }
    }
}

fn validate_join_columns(relation: &TableRelation) -> Result<(), ResolveError> {
    if relation.relation_type != RelationType::Join {
        return Ok(());
    }
    let valid = relation
        .join_column
        .as_ref()
        .is_some_and(|jc| !jc.left.is_empty() && !jc.right.is_empty());
    if !valid {
        return Err(ResolveError::InvalidRelation(
            "JOIN relation requires both left and right join columns".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryMetadataStore;

    fn physical(table: &str) -> TableSource {
        TableSource::Physical {
            catalog: "pg".to_string(),
            schema: "public".to_string(),
            table: table.to_string(),
        }
    }

    fn nested(id: &str) -> TableSource {
        TableSource::Relation {
            relation_id: id.to_string(),
        }
    }

    fn store_with(relations: Vec<TableRelation>) -> Arc<MemoryMetadataStore> {
        let store = Arc::new(MemoryMetadataStore::new());
        for relation in relations {
            store.create_table_relation(relation).unwrap();
        }
        store
    }

    fn union(id: &str, name: &str, left: TableSource, right: TableSource) -> TableRelation {
        TableRelation {
            id: id.to_string(),
            name: name.to_string(),
            left_table: left,
            right_table: right,
            relation_type: RelationType::Union,
            join_column: None,
            description: String::new(),
        }
    }

    #[test]
    fn test_resolve_physical_union() {
        let store = store_with(vec![union("r1", "all_users", physical("a"), physical("b"))]);
        let resolved = RelationResolver::new(store).resolve("r1").unwrap();
        assert_eq!(resolved.relation_type, RelationType::Union);
        assert!(resolved.left.is_physical());
        assert!(resolved.right.is_physical());
    }

    #[test]
    fn test_resolve_nested_relation() {
        let store = store_with(vec![
            union("inner", "inner_union", physical("a"), physical("b")),
            union("outer", "outer_union", physical("c"), nested("inner")),
        ]);
        let resolved = RelationResolver::new(store).resolve("outer").unwrap();
        assert_eq!(
            resolved.right,
            RelationNode::Relation {
                id: "inner".to_string(),
                relation_type: RelationType::Union,
            }
        );
    }

    #[test]
    fn test_resolve_detects_self_reference() {
        let store = store_with(vec![union("r1", "loop", physical("a"), nested("r1"))]);
        let err = RelationResolver::new(store).resolve("r1").unwrap_err();
        assert!(matches!(err, ResolveError::CircularRelation(id) if id == "r1"));
    }

    #[test]
    fn test_resolve_detects_mutual_cycle() {
        // The store enforces join-column and name invariants at creation, so
        // build the cycle across two unions.
        let store = store_with(vec![
            union("r1", "first", physical("a"), nested("r2")),
            union("r2", "second", physical("b"), nested("r1")),
        ]);
        let err = RelationResolver::new(store).resolve("r1").unwrap_err();
        assert!(matches!(err, ResolveError::CircularRelation(_)));
    }

    #[test]
    fn test_resolve_missing_relation() {
        let store = store_with(vec![]);
        let err = RelationResolver::new(store).resolve("ghost").unwrap_err();
        assert!(matches!(err, ResolveError::Store(_)));
    }
}
