//! Task data structures.
//!
//! This module defines the canonical `Task` produced by normalisation and the
//! `RawTask` input variants that arrive from data sources in one of two field
//! naming conventions.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::fields::Priority;

/// A normalised work item, independent of the source convention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    /// Position in the loaded batch.
    pub id: usize,
    pub client: Option<String>,
    pub title: String,
    pub start_date: NaiveDateTime,
    /// Set when the source carried a start date that could not be parsed.
    #[serde(skip)]
    pub invalid_start: bool,
    pub end_date: NaiveDateTime,
    pub due_date: NaiveDateTime,
    pub responsible: Option<String>,
    pub owner_group: Option<String>,
    pub owner_subgroup: Option<String>,
    pub owner_member: Option<String>,
    pub execution_group: Option<String>,
    pub status: Option<String>,
    pub priority: Priority,
    pub project: Option<String>,
    /// Request type (`tipo` / `RequestTypeName`).
    pub kind: Option<String>,
    pub number: Option<String>,
}

impl Task {
    /// "Group / Subgroup" path, or just the group when there is no subgroup.
    pub fn group_path(&self) -> Option<String> {
        match (&self.owner_group, &self.owner_subgroup) {
            (Some(g), Some(s)) => Some(format!("{g} / {s}")),
            (Some(g), None) => Some(g.clone()),
            _ => None,
        }
    }
}

/// Keys that only appear in the verbose, query-view convention.
pub const VERBOSE_MARKERS: &[&str] = &[
    "ClientNickname",
    "TaskTitle",
    "RequestDate",
    "TaskOwnerGroupName",
    "TaskExecutionFunctionGroupName",
    "client-nickname",
    "task-title",
    "request-date",
    "task-owner-group-name",
    "task-execution-function-group-name",
];

/// An as-received record, tagged by the naming convention it uses.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTask {
    /// `client`, `name`, `start`, `end`, `group_subgroup`, ...
    Compact(Map<String, Value>),
    /// `ClientNickname`, `TaskTitle`, `RequestDate`, `TaskOwnerGroupName`, ...
    Verbose(Map<String, Value>),
}

impl RawTask {
    /// Classify a mapping by the presence of verbose-only keys.
    pub fn detect(map: Map<String, Value>) -> RawTask {
        if VERBOSE_MARKERS.iter().any(|k| map.contains_key(*k)) {
            RawTask::Verbose(map)
        } else {
            RawTask::Compact(map)
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        match self {
            RawTask::Compact(m) | RawTask::Verbose(m) => m,
        }
    }

    /// First non-blank textual value among `keys`.
    ///
    /// Numbers and booleans are rendered as text; null, blank strings and
    /// nested structures count as absent.
    pub fn text(&self, keys: &[&str]) -> Option<String> {
        let map = self.fields();
        keys.iter().find_map(|k| match map.get(*k)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }
}
