use serde::{Deserialize, Serialize};
use std::fmt;

/// One side of a relation: either a concrete physical table or another
/// relation, referenced by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TableSource {
    Physical {
        catalog: String,
        schema: String,
        table: String,
    },
    Relation {
        #[serde(rename = "relationId")]
        relation_id: String,
    },
}

/// Join predicate columns for a JOIN relation: `left` belongs to the left
/// source, `right` to the right source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinColumn {
    pub left: String,
    pub right: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RelationType {
    Join,
    Union,
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationType::Join => write!(f, "JOIN"),
            RelationType::Union => write!(f, "UNION"),
        }
    }
}

/// A composite source combining two children via UNION or JOIN. Children may
/// themselves be relations, forming a tree resolved at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRelation {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub left_table: TableSource,
    pub right_table: TableSource,
    pub relation_type: RelationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_column: Option<JoinColumn>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_source_json_tagging() {
        let physical = TableSource::Physical {
            catalog: "pg".to_string(),
            schema: "public".to_string(),
            table: "users".to_string(),
        };
        let json = serde_json::to_value(&physical).unwrap();
        assert_eq!(json["type"], "physical");
        assert_eq!(json["catalog"], "pg");

        let nested: TableSource =
            serde_json::from_value(serde_json::json!({"type": "relation", "relationId": "r1"}))
                .unwrap();
        assert_eq!(
            nested,
            TableSource::Relation {
                relation_id: "r1".to_string()
            }
        );
    }

    #[test]
    fn test_relation_type_wire_format() {
        assert_eq!(
            serde_json::to_value(RelationType::Join).unwrap(),
            serde_json::json!("JOIN")
        );
        assert_eq!(
            serde_json::to_value(RelationType::Union).unwrap(),
            serde_json::json!("UNION")
        );
    }

    #[test]
    fn test_relation_round_trip() {
        let json = serde_json::json!({
            "id": "rel-1",
            "name": "customers",
            "leftTable": {"type": "physical", "catalog": "pg", "schema": "public", "table": "customers"},
            "rightTable": {"type": "physical", "catalog": "mysql", "schema": "crm", "table": "clients"},
            "relationType": "JOIN",
            "joinColumn": {"left": "id", "right": "customer_id"}
        });
        let relation: TableRelation = serde_json::from_value(json).unwrap();
        assert_eq!(relation.relation_type, RelationType::Join);
        assert_eq!(relation.join_column.as_ref().unwrap().left, "id");
        assert!(relation.description.is_empty());
    }
}
