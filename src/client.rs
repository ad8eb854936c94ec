use std::fmt;

use log::debug;
use serde_json::{json, Value};
use thiserror::Error;

use crate::query::{Group, Sort};
use crate::response::{QueryResponse, TransformError};

const API_BASE: &str = "https://api.quickbase.com/v1";
const USER_AGENT: &str = concat!("quickbase-json/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Quickbase API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Response(#[from] TransformError),
}

/// Optional parameters for a records query.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub sort_by: Option<Sort>,
    pub group_by: Option<Group>,
    pub skip: Option<u64>,
    pub top: Option<u64>,
}

/// Outcome of an upsert call, read from the endpoint's metadata block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertResponse {
    pub ok: bool,
    pub processed: u64,
    pub created_rids: Vec<i64>,
    pub updated_rids: Vec<i64>,
}

impl InsertResponse {
    fn from_value(ok: bool, body: &Value) -> Self {
        let metadata = &body["metadata"];
        let rids = |key: &str| -> Vec<i64> {
            metadata[key]
                .as_array()
                .map(|a| a.iter().filter_map(Value::as_i64).collect())
                .unwrap_or_default()
        };
        Self {
            ok,
            processed: metadata["totalNumberOfRecordsProcessed"]
                .as_u64()
                .unwrap_or_default(),
            created_rids: rids("createdRecordIds"),
            updated_rids: rids("updatedRecordIds"),
        }
    }
}

/// Async client for the Quickbase JSON REST API.
///
/// Holds the realm and user token and stamps the standard header set
/// (`QB-Realm-Hostname`, `Authorization`, `User-Agent`) on every request.
pub struct QuickbaseClient {
    http: reqwest::Client,
    realm: String,
    token: String,
    base_url: String,
}

impl QuickbaseClient {
    pub fn new(realm: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            realm: realm.into(),
            token: token.into(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Point the client at a different API root (e.g. a local mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("QB-Realm-Hostname", format!("{}.quickbase.com", self.realm))
            .header("Authorization", format!("QB-USER-TOKEN {}", self.token))
            .header("User-Agent", USER_AGENT)
    }

    /// Query for record data and decode the response envelope.
    /// <https://developer.quickbase.com/operation/runQuery>
    pub async fn query_records(
        &self,
        table: &str,
        select: &[i64],
        where_clause: &str,
        options: QueryOptions,
    ) -> Result<QueryResponse, ClientError> {
        let body = query_body(table, select, where_clause, &options)?;
        debug!("query_records body: {body}");

        let response = self
            .request(reqwest::Method::POST, "/records/query")
            .json(&body)
            .send()
            .await?;
        let payload = decode_api_response(response).await?;
        Ok(QueryResponse::from_value(payload)?)
    }

    /// Insert or update records in a table.
    /// <https://developer.quickbase.com/operation/upsert>
    pub async fn insert_update_records(
        &self,
        table: &str,
        data: Vec<Value>,
    ) -> Result<InsertResponse, ClientError> {
        let body = json!({"to": table, "data": data});
        debug!("insert_update_records body: {body}");

        let response = self
            .request(reqwest::Method::POST, "/records")
            .json(&body)
            .send()
            .await?;
        let ok = response.status().is_success();
        let payload = decode_api_response(response).await?;
        Ok(InsertResponse::from_value(ok, &payload))
    }

    /// Delete the records matching a filter; returns the number deleted.
    /// <https://developer.quickbase.com/operation/deleteRecords>
    pub async fn delete_records(&self, table: &str, where_clause: &str) -> Result<u64, ClientError> {
        let body = json!({"from": table, "where": where_clause});
        debug!("delete_records body: {body}");

        let response = self
            .request(reqwest::Method::DELETE, "/records")
            .json(&body)
            .send()
            .await?;
        let payload = decode_api_response(response).await?;
        Ok(payload["numberDeleted"].as_u64().unwrap_or_default())
    }

    /// Create a table in an application.
    /// <https://developer.quickbase.com/operation/createTable>
    pub async fn create_table(&self, app_id: &str, name: &str) -> Result<Value, ClientError> {
        let response = self
            .request(reqwest::Method::POST, "/tables")
            .query(&[("appId", app_id)])
            .json(&json!({"name": name}))
            .send()
            .await?;
        decode_api_response(response).await
    }

    /// List all tables in an application.
    /// <https://developer.quickbase.com/operation/getAppTables>
    pub async fn get_tables(&self, app_id: &str) -> Result<Value, ClientError> {
        let response = self
            .request(reqwest::Method::GET, "/tables")
            .query(&[("appId", app_id)])
            .send()
            .await?;
        decode_api_response(response).await
    }

    /// List the fields of a table.
    /// <https://developer.quickbase.com/operation/getFields>
    pub async fn get_fields(&self, table_id: &str) -> Result<Value, ClientError> {
        let response = self
            .request(reqwest::Method::GET, "/fields")
            .query(&[("tableId", table_id)])
            .send()
            .await?;
        decode_api_response(response).await
    }
}

impl fmt::Display for QuickbaseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tail: String = self.token.chars().rev().take(5).collect::<Vec<_>>().into_iter().rev().collect();
        let stars = "*".repeat(self.token.chars().count().saturating_sub(tail.chars().count()));
        write!(f, "Quickbase Client ---> {} : {stars}{tail}", self.realm)
    }
}

fn query_body(
    table: &str,
    select: &[i64],
    where_clause: &str,
    options: &QueryOptions,
) -> Result<Value, ClientError> {
    if table.is_empty() {
        return Err(ClientError::InvalidRequest("table cannot be blank".to_string()));
    }
    if select.is_empty() {
        return Err(ClientError::InvalidRequest(
            "selection must contain at least one field id".to_string(),
        ));
    }

    let mut map = serde_json::Map::new();
    map.insert("from".to_string(), Value::from(table));
    map.insert("select".to_string(), Value::from(select.to_vec()));
    map.insert("where".to_string(), Value::from(where_clause));
    if let Some(sort) = &options.sort_by {
        map.insert("sortBy".to_string(), sort.build());
    }
    if let Some(group) = &options.group_by {
        map.insert("groupBy".to_string(), group.build());
    }
    if options.skip.is_some() || options.top.is_some() {
        let mut opts = serde_json::Map::new();
        if let Some(skip) = options.skip {
            opts.insert("skip".to_string(), skip.into());
        }
        if let Some(top) = options.top {
            opts.insert("top".to_string(), top.into());
        }
        map.insert("options".to_string(), Value::Object(opts));
    }
    Ok(Value::Object(map))
}

async fn decode_api_response(response: reqwest::Response) -> Result<Value, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}
