use once_cell::sync::Lazy;
use regex::Regex;

use crate::services::query::error::ParseError;

static FROM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+FROM\s+([A-Za-z0-9_.]+)").unwrap());
static SELECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^SELECT\s+(.*?)\s+FROM\s").unwrap());
static LIMIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+LIMIT\s+(\d+)").unwrap());
static WHERE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)\s+WHERE\s+(.+?)(?:\s+LIMIT\s+\d+)?\s*$").unwrap());

/// A parsed single-table SELECT against the global schema.
///
/// The WHERE predicate is captured as raw text and later injected into the
/// physical SQL unchanged; identifiers inside it are not rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub table_name: String,
    pub columns: Vec<String>,
    pub where_clause: Option<String>,
    pub limit: Option<u64>,
    pub is_select_all: bool,
}

/// Parser for the restricted dialect accepted on the global surface:
/// `SELECT <columns> FROM <table> [WHERE <predicate>] [LIMIT <n>]`.
pub struct QueryParser;

impl QueryParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, query: &str) -> Result<ParsedQuery, ParseError> {
        let query = query.trim();

        if !query.to_uppercase().starts_with("SELECT") {
            return Err(ParseError("only SELECT queries are supported".to_string()));
        }

        let query = query.trim_end_matches(';');

        let table_name = FROM_RE
            .captures(query)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ParseError("invalid query: FROM clause not found".to_string()))?;
        if table_name.contains('.') {
            return Err(ParseError(format!(
                "global table name must be a bare identifier, got '{table_name}'"
            )));
        }

        let columns_str = SELECT_RE
            .captures(query)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .ok_or_else(|| ParseError("invalid query: SELECT clause not found".to_string()))?;

        let is_select_all = columns_str == "*";
        let columns = if is_select_all {
            Vec::new()
        } else {
            let columns: Vec<String> = columns_str
                .split(',')
                .map(|c| c.trim().to_string())
                .collect();
            if columns.iter().any(|c| c.is_empty()) {
                return Err(ParseError("invalid query: empty column in SELECT list".to_string()));
            }
            columns
        };

        let limit = match LIMIT_RE.captures(query).and_then(|c| c.get(1)) {
            Some(m) => Some(
                m.as_str()
                    .parse::<u64>()
                    .map_err(|_| ParseError("invalid LIMIT value".to_string()))?,
            ),
            None => None,
        };

        let where_clause = WHERE_RE
            .captures(query)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|w| !w.is_empty());

        Ok(ParsedQuery {
            table_name,
            columns,
            where_clause,
            limit,
            is_select_all,
        })
    }
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select_star_with_semicolon() {
        let parsed = QueryParser::new().parse("select * from customers;").unwrap();
        assert!(parsed.is_select_all);
        assert!(parsed.columns.is_empty());
        assert_eq!(parsed.table_name, "customers");
        assert_eq!(parsed.where_clause, None);
        assert_eq!(parsed.limit, None);
    }

    #[test]
    fn test_parse_columns_where_and_limit() {
        let parsed = QueryParser::new()
            .parse("SELECT a FROM t WHERE b=1 LIMIT 10")
            .unwrap();
        assert_eq!(parsed.columns, vec!["a"]);
        assert_eq!(parsed.table_name, "t");
        assert_eq!(parsed.where_clause.as_deref(), Some("b=1"));
        assert_eq!(parsed.limit, Some(10));
    }

    #[test]
    fn test_parse_column_list() {
        let parsed = QueryParser::new()
            .parse("SELECT id , name,email FROM users")
            .unwrap();
        assert_eq!(parsed.columns, vec!["id", "name", "email"]);
        assert!(!parsed.is_select_all);
    }

    #[test]
    fn test_parse_where_without_limit() {
        let parsed = QueryParser::new()
            .parse("SELECT id FROM users WHERE country = 'PT' AND age > 30")
            .unwrap();
        assert_eq!(
            parsed.where_clause.as_deref(),
            Some("country = 'PT' AND age > 30")
        );
        assert_eq!(parsed.limit, None);
    }

    #[test]
    fn test_parse_rejects_non_select() {
        assert!(QueryParser::new().parse("DELETE FROM t").is_err());
        assert!(QueryParser::new().parse("SHOW CATALOGS").is_err());
    }

    #[test]
    fn test_parse_rejects_qualified_table() {
        assert!(QueryParser::new().parse("SELECT a FROM pg.public.t").is_err());
    }

    #[test]
    fn test_parse_requires_from() {
        assert!(QueryParser::new().parse("SELECT 1").is_err());
    }
}
