//! Field normalisation: raw records in either naming convention become [`Task`]s.
//!
//! Missing optional fields are completed with defaults rather than rejected.
//! Only a record that is not a mapping at all fails, and that failure aborts
//! the whole batch.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{DashboardError, Result};
use crate::hierarchy::{correct_legacy, split_path, HierarchyPolicy, OwnerLevels};
use crate::priority::resolve_priority;
use crate::task::{RawTask, Task};

/// Title used when a record carries none.
pub const PLACEHOLDER_TITLE: &str = "Sem título";

/// Days added to the start when a compact record has no end date.
pub const COMPACT_GRACE_DAYS: i64 = 3;

/// Days added to the start when a verbose record has no end date.
pub const VERBOSE_GRACE_DAYS: i64 = 7;

/// Parse the date forms found in exports, without timezone conversion.
///
/// A space between date and time is rewritten to `T` first. An explicit
/// offset is accepted and discarded, keeping the wall-clock time.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    let canonical = match trimmed.split_once(' ') {
        Some((date, time)) => format!("{date}T{}", time.trim()),
        None => trimmed.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&canonical) {
        return Some(dt.naive_local());
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%d/%m/%YT%H:%M:%S",
        "%d/%m/%YT%H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&canonical, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(&canonical, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Converts raw records into tasks using one hierarchy policy and a fixed clock.
pub struct Normalizer {
    policy: Box<dyn HierarchyPolicy>,
    now: NaiveDateTime,
}

impl Normalizer {
    pub fn new(policy: Box<dyn HierarchyPolicy>, now: NaiveDateTime) -> Self {
        Self { policy, now }
    }

    /// Normalise a whole response body. A non-object element aborts the batch.
    pub fn normalize_batch(&self, records: Vec<Value>) -> Result<Vec<Task>> {
        let tasks = records
            .into_iter()
            .enumerate()
            .map(|(index, value)| self.normalize_value(index, value))
            .collect::<Result<Vec<_>>>()?;
        debug!(count = tasks.len(), "normalised task batch");
        Ok(tasks)
    }

    /// Normalise a single JSON value, which must be an object.
    pub fn normalize_value(&self, index: usize, value: Value) -> Result<Task> {
        match value {
            Value::Object(map) => Ok(self.normalize(index, RawTask::detect(map))),
            other => Err(DashboardError::NotAMapping {
                index,
                found: json_kind(&other),
            }),
        }
    }

    pub fn normalize(&self, id: usize, raw: RawTask) -> Task {
        match &raw {
            RawTask::Compact(_) => self.normalize_compact(id, &raw),
            RawTask::Verbose(_) => self.normalize_verbose(id, &raw),
        }
    }

    fn normalize_compact(&self, id: usize, raw: &RawTask) -> Task {
        let explicit = OwnerLevels {
            group: raw.text(&["TaskOwnerGroup"]),
            subgroup: raw.text(&["TaskOwnerSubgroup"]),
            member: raw.text(&["TaskOwnerMember"]),
        };
        let levels = if explicit != OwnerLevels::default() {
            correct_legacy(explicit).tidy()
        } else {
            raw.text(&["group_subgroup"])
                .map(|path| self.policy.parse(&path))
                .unwrap_or_default()
        };

        let (start, invalid_start) = self.start_date(id, raw.text(&["start"]));
        let end = self.end_date(id, start, raw.text(&["end"]), COMPACT_GRACE_DAYS);
        let due = raw
            .text(&["due"])
            .and_then(|s| parse_date(&s))
            .unwrap_or(end);
        let status = raw.text(&["PipelineStepTitle", "status"]);
        let priority = resolve_priority(raw.text(&["Priority", "priority"]).as_deref(), status.as_deref());
        let execution_group = raw
            .text(&["TaskExecutionFunctionGroupName", "execution_group"])
            .or_else(|| levels.group.clone());

        Task {
            id,
            client: raw.text(&["client"]),
            title: raw.text(&["name"]).unwrap_or_else(|| PLACEHOLDER_TITLE.to_string()),
            start_date: start,
            invalid_start,
            end_date: end,
            due_date: due,
            responsible: raw.text(&["responsible"]),
            owner_group: levels.group,
            owner_subgroup: levels.subgroup,
            owner_member: levels.member,
            execution_group,
            status,
            priority,
            project: raw.text(&["project"]),
            kind: raw.text(&["tipo"]),
            number: None,
        }
    }

    fn normalize_verbose(&self, id: usize, raw: &RawTask) -> Task {
        let levels = raw
            .text(&["TaskOwnerGroupName", "task-owner-group-name"])
            .map(|name| split_owner_group(&name))
            .unwrap_or_default();

        let (start, invalid_start) = self.start_date(id, raw.text(&["RequestDate", "request-date"]));
        let end = self.end_date(
            id,
            start,
            raw.text(&[
                "TaskClosingDate",
                "EndDate",
                "CurrentDueDate",
                "task-closing-date",
                "end-date",
                "current-due-date",
            ]),
            VERBOSE_GRACE_DAYS,
        );
        let due = raw
            .text(&["CurrentDueDate", "current-due-date"])
            .and_then(|s| parse_date(&s))
            .unwrap_or(end);
        let status = raw.text(&["PipelineStepTitle", "pipeline-step-title"]);
        let priority = resolve_priority(raw.text(&["Priority", "priority"]).as_deref(), status.as_deref());
        let execution_group = raw
            .text(&["TaskExecutionFunctionGroupName", "task-execution-function-group-name"])
            .or_else(|| levels.group.clone());

        Task {
            id,
            client: raw.text(&["ClientNickname", "client-nickname"]),
            title: raw
                .text(&["TaskTitle", "task-title"])
                .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string()),
            start_date: start,
            invalid_start,
            end_date: end,
            due_date: due,
            responsible: raw.text(&["TaskOwnerDisplayName", "task-owner-display-name"]),
            owner_group: levels.group,
            owner_subgroup: levels.subgroup,
            owner_member: levels.member,
            execution_group,
            status,
            priority,
            project: raw.text(&["project"]),
            kind: raw.text(&["RequestTypeName", "request-type-name"]),
            number: raw.text(&["TaskNumber", "task-number"]),
        }
    }

    /// Start date and whether the source value was unparseable.
    ///
    /// An unparseable start is still placed at `now` for display but is flagged
    /// so the recency filter can reject it.
    fn start_date(&self, id: usize, raw: Option<String>) -> (NaiveDateTime, bool) {
        match raw {
            None => (self.now, false),
            Some(s) => match parse_date(&s) {
                Some(dt) => (dt, false),
                None => {
                    warn!(task = id, value = %s, "unparseable start date");
                    (self.now, true)
                }
            },
        }
    }

    fn end_date(&self, id: usize, start: NaiveDateTime, raw: Option<String>, grace_days: i64) -> NaiveDateTime {
        let fallback = start + Duration::days(grace_days);
        let end = match raw {
            None => fallback,
            Some(s) => parse_date(&s).unwrap_or_else(|| {
                warn!(task = id, value = %s, "unparseable end date, using grace period");
                fallback
            }),
        };
        end.max(start)
    }
}

/// Split a verbose owner-group name: first segment is the group, the rest the subgroup.
pub fn split_owner_group(name: &str) -> OwnerLevels {
    let parts = split_path(name, &[">>", "/"]);
    let levels = match parts.split_first() {
        None => OwnerLevels::default(),
        Some((group, rest)) => OwnerLevels {
            group: Some(group.to_string()),
            subgroup: (!rest.is_empty()).then(|| rest.join(" / ")),
            member: None,
        },
    };
    correct_legacy(levels).tidy()
}
