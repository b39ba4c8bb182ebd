use crate::models::{RelationType, TableMapping};
use crate::services::query::column_mapper::ColumnMap;
use crate::services::query::error::GenerateError;
use crate::services::query::relation::{RelationNode, ResolvedRelation};

/// Emits executor SQL from resolved components. Physical identifiers are
/// always fully qualified `catalog.schema.table`; the WHERE predicate and
/// LIMIT are appended verbatim.
pub struct SqlGenerator;

impl SqlGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Single-table SELECT against one physical target.
    pub fn generate_select(
        &self,
        table: &TableMapping,
        column_map: &ColumnMap,
        global_columns: &[String],
        where_clause: Option<&str>,
        limit: Option<u64>,
        select_all: bool,
    ) -> Result<String, GenerateError> {
        let select_clause = if select_all {
            "*".to_string()
        } else {
            let physical: Vec<&str> = global_columns
                .iter()
                .map(|c| {
                    column_map
                        .get(c)
                        .map(String::as_str)
                        .ok_or_else(|| GenerateError::UnmappedColumn(c.clone()))
                })
                .collect::<Result<_, _>>()?;
            physical.join(", ")
        };

        let mut query = format!("SELECT {} FROM {}", select_clause, table.qualified_name());
        if let Some(predicate) = where_clause {
            query.push_str(&format!(" WHERE {predicate}"));
        }
        if let Some(limit) = limit {
            query.push_str(&format!(" LIMIT {limit}"));
        }
        Ok(query)
    }

    /// UNION over N physical tables: each arm is a single-table SELECT
    /// without its own LIMIT; the WHERE predicate repeats inside every arm
    /// and the LIMIT is applied once, outside.
    pub fn generate_union(
        &self,
        tables: &[TableMapping],
        column_maps: &[ColumnMap],
        global_columns: &[String],
        where_clause: Option<&str>,
        limit: Option<u64>,
        select_all: bool,
    ) -> Result<String, GenerateError> {
        if tables.is_empty() {
            return Err(GenerateError::EmptyUnion);
        }
        if tables.len() != column_maps.len() {
            return Err(GenerateError::ColumnMapMismatch);
        }

        let arms: Vec<String> = tables
            .iter()
            .zip(column_maps)
            .map(|(table, column_map)| {
                self.generate_select(
                    table,
                    column_map,
                    global_columns,
                    where_clause,
                    None,
                    select_all,
                )
            })
            .collect::<Result<_, _>>()?;

        let mut query = arms.join(" UNION ");
        if let Some(limit) = limit {
            query.push_str(&format!(" LIMIT {limit}"));
        }
        Ok(query)
    }

    /// UNION from an explicit relation. Both arms must be physical leaves.
    pub fn generate_union_from_relation(
        &self,
        relation: &ResolvedRelation,
        column_maps: &[ColumnMap],
        global_columns: &[String],
        where_clause: Option<&str>,
        limit: Option<u64>,
        select_all: bool,
    ) -> Result<String, GenerateError> {
        let tables = physical_leaves(relation)?;
        self.generate_union(
            &tables,
            column_maps,
            global_columns,
            where_clause,
            limit,
            select_all,
        )
    }

    /// JOIN from an explicit relation: left and right bind to aliases `t1`
    /// and `t2`. `SELECT *` becomes `t1.*, t2.*`; explicit columns prefer
    /// the left table's mapping and fall back to the right.
    pub fn generate_join_from_relation(
        &self,
        relation: &ResolvedRelation,
        column_maps: &[ColumnMap],
        global_columns: &[String],
        where_clause: Option<&str>,
        limit: Option<u64>,
        select_all: bool,
    ) -> Result<String, GenerateError> {
        if relation.relation_type != RelationType::Join {
            return Err(GenerateError::WrongRelationType {
                actual: "UNION",
                wanted: "JOIN",
            });
        }
        let join_column = relation
            .join_column
            .as_ref()
            .ok_or(GenerateError::MissingJoinColumns)?;
        let [left, right] = physical_pair(relation)?;

        let select_clause = if select_all {
            "t1.*, t2.*".to_string()
        } else {
            if column_maps.len() != 2 {
                return Err(GenerateError::ColumnMapMismatch);
            }
            let parts: Vec<String> = global_columns
                .iter()
                .map(|c| {
                    if let Some(physical) = column_maps[0].get(c) {
                        Ok(format!("t1.{physical}"))
                    } else if let Some(physical) = column_maps[1].get(c) {
                        Ok(format!("t2.{physical}"))
                    } else {
                        Err(GenerateError::UnmappedColumn(c.clone()))
                    }
                })
                .collect::<Result<_, _>>()?;
            parts.join(", ")
        };

        let mut query = format!(
            "SELECT {} FROM {} t1 JOIN {} t2 ON t1.{} = t2.{}",
            select_clause,
            left.qualified_name(),
            right.qualified_name(),
            join_column.left,
            join_column.right,
        );
        if let Some(predicate) = where_clause {
            query.push_str(&format!(" WHERE {predicate}"));
        }
        if let Some(limit) = limit {
            query.push_str(&format!(" LIMIT {limit}"));
        }
        Ok(query)
    }
}

impl Default for SqlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn leaf(node: &RelationNode) -> Result<TableMapping, GenerateError> {
    match node {
        RelationNode::Physical {
            catalog,
            schema,
            table,
        } => Ok(TableMapping {
            global_table_name: String::new(),
            catalog_name: catalog.clone(),
            schema_name: schema.clone(),
            table_name: table.clone(),
        }),
        RelationNode::Relation { .. } => Err(GenerateError::NestedRelation),
    }
}

fn physical_pair(relation: &ResolvedRelation) -> Result<[TableMapping; 2], GenerateError> {
    Ok([leaf(&relation.left)?, leaf(&relation.right)?])
}

fn physical_leaves(relation: &ResolvedRelation) -> Result<Vec<TableMapping>, GenerateError> {
    if relation.relation_type != RelationType::Union {
        return Err(GenerateError::WrongRelationType {
            actual: "JOIN",
            wanted: "UNION",
        });
    }
    Ok(physical_pair(relation)?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JoinColumn;

    fn mapping(catalog: &str, schema: &str, table: &str) -> TableMapping {
        TableMapping {
            global_table_name: "g".to_string(),
            catalog_name: catalog.to_string(),
            schema_name: schema.to_string(),
            table_name: table.to_string(),
        }
    }

    fn identity_map(columns: &[&str]) -> ColumnMap {
        columns
            .iter()
            .map(|c| (c.to_string(), c.to_string()))
            .collect()
    }

    #[test]
    fn test_generate_select_with_where_and_limit() {
        let generator = SqlGenerator::new();
        let sql = generator
            .generate_select(
                &mapping("catA", "schB", "tabC"),
                &identity_map(&["id", "name"]),
                &["id".to_string(), "name".to_string()],
                Some("x=1"),
                Some(5),
                false,
            )
            .unwrap();
        assert_eq!(sql, "SELECT id, name FROM catA.schB.tabC WHERE x=1 LIMIT 5");
    }

    #[test]
    fn test_generate_select_star() {
        let generator = SqlGenerator::new();
        let sql = generator
            .generate_select(&mapping("pg", "public", "users"), &ColumnMap::new(), &[], None, None, true)
            .unwrap();
        assert_eq!(sql, "SELECT * FROM pg.public.users");
    }

    #[test]
    fn test_generate_select_unmapped_column() {
        let generator = SqlGenerator::new();
        let err = generator
            .generate_select(
                &mapping("pg", "public", "users"),
                &ColumnMap::new(),
                &["id".to_string()],
                None,
                None,
                false,
            )
            .unwrap_err();
        assert!(matches!(err, GenerateError::UnmappedColumn(c) if c == "id"));
    }

    #[test]
    fn test_generate_union_applies_limit_once() {
        let generator = SqlGenerator::new();
        let tables = vec![mapping("c1", "s1", "t1"), mapping("c2", "s2", "t2")];
        let maps = vec![
            [("id".to_string(), "pid".to_string())].into_iter().collect(),
            [("id".to_string(), "pid".to_string())].into_iter().collect(),
        ];
        let sql = generator
            .generate_union(&tables, &maps, &["id".to_string()], None, Some(3), false)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT pid FROM c1.s1.t1 UNION SELECT pid FROM c2.s2.t2 LIMIT 3"
        );
    }

    #[test]
    fn test_generate_union_repeats_where_in_each_arm() {
        let generator = SqlGenerator::new();
        let tables = vec![mapping("c1", "s1", "t1"), mapping("c2", "s2", "t2")];
        let maps = vec![identity_map(&["id"]), identity_map(&["id"])];
        let sql = generator
            .generate_union(&tables, &maps, &["id".to_string()], Some("id > 7"), None, false)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT id FROM c1.s1.t1 WHERE id > 7 UNION SELECT id FROM c2.s2.t2 WHERE id > 7"
        );
    }

    #[test]
    fn test_generate_join_select_star() {
        let generator = SqlGenerator::new();
        let relation = ResolvedRelation {
            id: "r1".to_string(),
            name: "g".to_string(),
            relation_type: RelationType::Join,
            left: RelationNode::Physical {
                catalog: "c1".to_string(),
                schema: "s1".to_string(),
                table: "t1".to_string(),
            },
            right: RelationNode::Physical {
                catalog: "c2".to_string(),
                schema: "s2".to_string(),
                table: "t2".to_string(),
            },
            join_column: Some(JoinColumn {
                left: "uid".to_string(),
                right: "user_id".to_string(),
            }),
        };
        let sql = generator
            .generate_join_from_relation(&relation, &[], &[], None, Some(2), true)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT t1.*, t2.* FROM c1.s1.t1 t1 JOIN c2.s2.t2 t2 ON t1.uid = t2.user_id LIMIT 2"
        );
    }

    #[test]
    fn test_generate_join_prefers_left_mapping() {
        let generator = SqlGenerator::new();
        let relation = ResolvedRelation {
            id: "r1".to_string(),
            name: "g".to_string(),
            relation_type: RelationType::Join,
            left: RelationNode::Physical {
                catalog: "c1".to_string(),
                schema: "s1".to_string(),
                table: "t1".to_string(),
            },
            right: RelationNode::Physical {
                catalog: "c2".to_string(),
                schema: "s2".to_string(),
                table: "t2".to_string(),
            },
            join_column: Some(JoinColumn {
                left: "id".to_string(),
                right: "id".to_string(),
            }),
        };
        let maps = vec![
            [("name".to_string(), "left_name".to_string())]
                .into_iter()
                .collect(),
            [
                ("name".to_string(), "right_name".to_string()),
                ("email".to_string(), "right_email".to_string()),
            ]
            .into_iter()
            .collect(),
        ];
        let sql = generator
            .generate_join_from_relation(
                &relation,
                &maps,
                &["name".to_string(), "email".to_string()],
                None,
                None,
                false,
            )
            .unwrap();
        assert_eq!(
            sql,
            "SELECT t1.left_name, t2.right_email FROM c1.s1.t1 t1 JOIN c2.s2.t2 t2 ON t1.id = t2.id"
        );
    }

    #[test]
    fn test_generate_rejects_nested_arm() {
        let generator = SqlGenerator::new();
        let relation = ResolvedRelation {
            id: "outer".to_string(),
            name: "g".to_string(),
            relation_type: RelationType::Union,
            left: RelationNode::Physical {
                catalog: "c1".to_string(),
                schema: "s1".to_string(),
                table: "t1".to_string(),
            },
            right: RelationNode::Relation {
                id: "inner".to_string(),
                relation_type: RelationType::Union,
            },
            join_column: None,
        };
        let err = generator
            .generate_union_from_relation(&relation, &[ColumnMap::new(), ColumnMap::new()], &[], None, None, true)
            .unwrap_err();
        assert!(matches!(err, GenerateError::NestedRelation));
    }
}
