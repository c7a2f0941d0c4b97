//! Loading raw task records from the configured data source.
//!
//! A JSON source is a local file or an `http(s)` URL holding an array of
//! records. The query source goes through a [`QueryClient`], whose tabular
//! response is reshaped into column-named records before normalisation.

use std::fs;

use chrono::{Duration, NaiveDateTime};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::error::{DashboardError, Result};
use crate::fields::DataSourceKind;
use crate::hierarchy::policy_for;
use crate::normalize::Normalizer;
use crate::settings::Settings;
use crate::store::TaskStore;

/// Columns requested from the task view.
pub const TASK_VIEW_FIELDS: &[&str] = &[
    "ClientNickname",
    "TaskNumber",
    "TaskTitle",
    "RequestDate",
    "UnitName",
    "EndDate",
    "CurrentDueDate",
    "RequestTypeName",
    "TaskExecutionFunctionGroupName",
    "TaskOwnerDisplayName",
    "TaskOwnerGroupName",
    "TaskClosingDate",
];

pub const QUERY_LIMIT: usize = 1000;

/// Days of history requested from the query source.
pub const QUERY_DAYS_BACK: i64 = 90;

/// Environment variable holding the query service bearer token.
pub const TOKEN_ENV: &str = "TASKBOARD_QUERY_TOKEN";

const QUERY_ENDPOINT: &str = "https://bigquery.googleapis.com/bigquery/v2/projects";

/// Parse a response body into its list of records.
pub fn parse_records(body: &str) -> Result<Vec<Value>> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| DashboardError::MalformedSource(e.to_string()))?;
    match value {
        Value::Array(items) => Ok(items),
        other => Err(DashboardError::MalformedSource(format!(
            "expected an array of task records, found {}",
            match other {
                Value::Object(_) => "an object",
                Value::String(_) => "a string",
                Value::Number(_) => "a number",
                Value::Bool(_) => "a boolean",
                _ => "null",
            }
        ))),
    }
}

/// Fetch the body of a JSON source: `http(s)` URLs over the network, anything else from disk.
pub fn fetch_json(location: &str) -> Result<String> {
    if location.starts_with("http://") || location.starts_with("https://") {
        let resp = reqwest::blocking::get(location)
            .map_err(|e| DashboardError::SourceUnavailable(format!("{location}: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DashboardError::SourceUnavailable(format!(
                "{location}: HTTP {status}"
            )));
        }
        resp.text()
            .map_err(|e| DashboardError::SourceUnavailable(format!("{location}: {e}")))
    } else {
        fs::read_to_string(location)
            .map_err(|e| DashboardError::SourceUnavailable(format!("{location}: {e}")))
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FieldSchema {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct TableSchema {
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Cell {
    #[serde(default)]
    pub v: Value,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Row {
    #[serde(default)]
    pub f: Vec<Cell>,
}

/// Column schema plus row-major cells, as returned by the query service.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct QueryResponse {
    #[serde(default)]
    pub schema: TableSchema,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl QueryResponse {
    /// Reshape rows into objects keyed by column name. Missing cells become null.
    pub fn into_records(self) -> Vec<Value> {
        let names: Vec<String> = self.schema.fields.into_iter().map(|f| f.name).collect();
        self.rows
            .into_iter()
            .map(|row| {
                let mut cells = row.f.into_iter();
                let map: Map<String, Value> = names
                    .iter()
                    .map(|name| (name.clone(), cells.next().map(|c| c.v).unwrap_or(Value::Null)))
                    .collect();
                Value::Object(map)
            })
            .collect()
    }
}

/// The remote query collaborator.
pub trait QueryClient {
    fn is_authenticated(&self) -> bool;
    fn query(&self, project_id: &str, sql: &str) -> Result<QueryResponse>;
}

/// Build the table query: selected fields, optional filter and a row limit.
pub fn build_table_query(
    project_id: &str,
    dataset: &str,
    table: &str,
    fields: &[&str],
    filter: Option<&str>,
    limit: usize,
) -> String {
    let columns = if fields.is_empty() {
        "*".to_string()
    } else {
        fields.join(", ")
    };
    let mut sql = format!("SELECT {columns} FROM `{project_id}.{dataset}.{table}`");
    if let Some(f) = filter {
        sql.push_str(&format!(" WHERE {f}"));
    }
    sql.push_str(&format!(" LIMIT {limit}"));
    sql
}

/// Recency clause on the request date.
pub fn recency_filter(now: NaiveDateTime, days_back: i64) -> String {
    let since = (now - Duration::days(days_back)).format("%Y-%m-%d");
    format!("RequestDate >= \"{since}\"")
}

/// Run the task-view query and return its reshaped records.
pub fn fetch_query<C: QueryClient + ?Sized>(
    client: &C,
    settings: &Settings,
    now: NaiveDateTime,
) -> Result<Vec<Value>> {
    if !client.is_authenticated() {
        return Err(DashboardError::MissingAuthentication);
    }
    let sql = build_table_query(
        &settings.project_id,
        &settings.dataset,
        &settings.table,
        TASK_VIEW_FIELDS,
        Some(&recency_filter(now, QUERY_DAYS_BACK)),
        QUERY_LIMIT,
    );
    debug!(%sql, "running task query");
    let records = client.query(&settings.project_id, &sql)?.into_records();
    info!(count = records.len(), "query returned task rows");
    Ok(records)
}

/// Query client that posts to the query REST endpoint with a bearer token.
pub struct HttpQueryClient {
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpQueryClient {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Token taken from [`TOKEN_ENV`]; unset means unauthenticated.
    pub fn from_env() -> Self {
        Self::new(std::env::var(TOKEN_ENV).ok())
    }
}

impl QueryClient for HttpQueryClient {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn query(&self, project_id: &str, sql: &str) -> Result<QueryResponse> {
        let token = self.token.as_ref().ok_or(DashboardError::MissingAuthentication)?;
        let url = format!("{QUERY_ENDPOINT}/{project_id}/queries");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "query": sql, "useLegacySql": false }))
            .send()
            .map_err(|e| DashboardError::SourceUnavailable(format!("query request failed: {e}")))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(DashboardError::MissingAuthentication);
        }
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(DashboardError::SourceUnavailable(format!(
                "query service returned {status}: {body}"
            )));
        }
        resp.json::<QueryResponse>()
            .map_err(|e| DashboardError::MalformedSource(format!("query response: {e}")))
    }
}

/// Fetch raw records from the source selected in `settings`.
pub fn fetch_records(
    settings: &Settings,
    client: &dyn QueryClient,
    now: NaiveDateTime,
) -> Result<Vec<Value>> {
    match settings.data_source {
        DataSourceKind::Json => parse_records(&fetch_json(&settings.json_url)?),
        DataSourceKind::Bigquery => fetch_query(client, settings, now),
    }
}

/// One load cycle: fetch, normalise, and commit into `store` under a fresh ticket.
///
/// On failure the store keeps whatever it held before.
pub fn load_into(
    store: &mut TaskStore,
    settings: &Settings,
    client: &dyn QueryClient,
    now: NaiveDateTime,
) -> Result<usize> {
    let ticket = store.begin_load();
    let normalizer = Normalizer::new(policy_for(settings.hierarchy_policy), now);
    let outcome = fetch_records(settings, client, now)
        .and_then(|records| normalizer.normalize_batch(records));
    match outcome {
        Ok(tasks) => {
            let count = tasks.len();
            store.commit(ticket, tasks);
            info!(count, source = settings.data_source.as_str(), "loaded tasks");
            Ok(count)
        }
        Err(e) => {
            store.abandon(ticket);
            Err(e)
        }
    }
}
