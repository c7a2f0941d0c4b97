//! Error kinds surfaced at the load, settings and export boundaries.

use thiserror::Error;

/// Failures that abort a dashboard operation.
///
/// An empty filter result is deliberately absent: it is a valid display state.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The data source could not be reached (network, HTTP status or file read).
    #[error("data source unavailable: {0}")]
    SourceUnavailable(String),

    /// The response body is not a sequence of task records.
    #[error("malformed data source: {0}")]
    MalformedSource(String),

    /// The query collaborator was invoked without credentials.
    #[error("not authenticated with the query service; set TASKBOARD_QUERY_TOKEN")]
    MissingAuthentication,

    /// A record in the batch is not a key/value mapping.
    #[error("record {index} is not an object (found {found})")]
    NotAMapping { index: usize, found: &'static str },

    #[error("settings error: {0}")]
    Settings(#[from] std::io::Error),

    #[error("settings file is not valid JSON: {0}")]
    SettingsFormat(#[from] serde_json::Error),

    #[error("unknown setting '{0}' (expected one of: data_source, json_url, project_id, dataset, table, hierarchy_policy)")]
    UnknownSetting(String),

    #[error("invalid value '{value}' for setting '{key}'")]
    InvalidSetting { key: String, value: String },

    #[error("failed to write export file {path}: {source}")]
    Export {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DashboardError>;
