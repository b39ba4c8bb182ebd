use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::services::engine::{EngineError, QueryEngine, QueryResult, Row};

/// Query engine speaking Trino's HTTP statement protocol: a statement is
/// POSTed to `/v1/statement` and its result pages are collected by following
/// `nextUri` until the server stops returning one.
pub struct TrinoEngine {
    http_client: HttpClient,
    base_url: String,
    user: String,
    catalog: Option<String>,
    schema: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    #[serde(default)]
    columns: Option<Vec<StatementColumn>>,
    #[serde(default)]
    data: Option<Vec<Vec<Value>>>,
    #[serde(default)]
    next_uri: Option<String>,
    #[serde(default)]
    error: Option<StatementError>,
}

#[derive(Debug, Deserialize)]
struct StatementColumn {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementError {
    message: String,
    #[serde(default)]
    error_name: Option<String>,
}

impl TrinoEngine {
    pub fn new(
        base_url: impl Into<String>,
        user: impl Into<String>,
        catalog: Option<String>,
        schema: Option<String>,
    ) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.into(),
            user: user.into(),
            catalog,
            schema,
        }
    }

    async fn parse_page(
        &self,
        response: reqwest::Response,
    ) -> Result<StatementResponse, EngineError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Transport(format!(
                "executor returned {status}: {body}"
            )));
        }
        response
            .json::<StatementResponse>()
            .await
            .map_err(|e| EngineError::Transport(format!("invalid statement response: {e}")))
    }
}

#[async_trait]
impl QueryEngine for TrinoEngine {
    async fn execute_query(
        &self,
        sql: &str,
        params: Option<HashMap<String, Value>>,
    ) -> Result<QueryResult, EngineError> {
        // The statement protocol has no parameter channel; the interface
        // forwards params so other engines can bind them.
        if params.as_ref().is_some_and(|p| !p.is_empty()) {
            return Err(EngineError::Query(
                "statement parameters are not supported by the Trino HTTP transport".to_string(),
            ));
        }

        let mut request = self
            .http_client
            .post(format!("{}/v1/statement", self.base_url))
            .header("X-Trino-User", self.user.as_str())
            .body(sql.to_string());
        if let Some(catalog) = &self.catalog {
            request = request.header("X-Trino-Catalog", catalog.as_str());
        }
        if let Some(schema) = &self.schema {
            request = request.header("X-Trino-Schema", schema.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;
        let mut page = self.parse_page(response).await?;

        let mut column_names: Vec<String> = Vec::new();
        let mut data: Vec<Vec<Value>> = Vec::new();

        loop {
            if let Some(error) = page.error {
                let name = error.error_name.unwrap_or_else(|| "QUERY_ERROR".to_string());
                return Err(EngineError::Query(format!("{}: {}", name, error.message)));
            }
            if column_names.is_empty() {
                if let Some(columns) = &page.columns {
                    column_names = columns.iter().map(|c| c.name.clone()).collect();
                }
            }
            if let Some(rows) = page.data {
                data.extend(rows);
            }

            let Some(next_uri) = page.next_uri else {
                break;
            };
            let response = self
                .http_client
                .get(&next_uri)
                .header("X-Trino-User", self.user.as_str())
                .send()
                .await
                .map_err(|e| EngineError::Transport(e.to_string()))?;
            page = self.parse_page(response).await?;
        }

        let rows = data
            .into_iter()
            .map(|values| {
                let mut row = Row::new();
                for (name, value) in column_names.iter().zip(values) {
                    row.insert(name.clone(), value);
                }
                row
            })
            .collect();

        Ok(QueryResult { rows })
    }
}
