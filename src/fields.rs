//! Enumerations and small value types shared across the pipeline.
//!
//! This module defines priority tiers, data source kinds, hierarchy policy
//! selection, timeline grouping and the "all or one value" filter selection.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Priority tier; always populated on a normalised task.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Parse an explicit priority value; unrecognised text yields `None`.
    pub fn parse(s: &str) -> Option<Priority> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Display label used in exports.
    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "Alta",
            Priority::Medium => "Média",
            Priority::Low => "Baixa",
        }
    }

    /// CSS class consumed by the timeline renderer.
    pub fn css_class(self) -> &'static str {
        match self {
            Priority::High => "task-priority-high",
            Priority::Medium => "task-priority-medium",
            Priority::Low => "task-priority-low",
        }
    }
}

/// Where task records are loaded from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DataSourceKind {
    #[default]
    Json,
    Bigquery,
}

impl DataSourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DataSourceKind::Json => "json",
            DataSourceKind::Bigquery => "bigquery",
        }
    }
}

impl FromStr for DataSourceKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(DataSourceKind::Json),
            "bigquery" => Ok(DataSourceKind::Bigquery),
            _ => Err(()),
        }
    }
}

/// Which group-path decoding strategy the normaliser applies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum HierarchyPolicyKind {
    #[default]
    Positional,
    Vocabulary,
}

impl HierarchyPolicyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HierarchyPolicyKind::Positional => "positional",
            HierarchyPolicyKind::Vocabulary => "vocabulary",
        }
    }
}

impl FromStr for HierarchyPolicyKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positional" => Ok(HierarchyPolicyKind::Positional),
            "vocabulary" => Ok(HierarchyPolicyKind::Vocabulary),
            _ => Err(()),
        }
    }
}

/// Key used to place timeline items into swimlanes.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum TimelineGrouping {
    #[default]
    Member,
    ExecutionGroup,
}

/// A filter selection: either everything or one exact value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Build from a user-supplied value; "all", "todos" and blank mean [`Selection::All`].
    pub fn from_input(s: Option<&str>) -> Selection {
        match s.map(str::trim) {
            None | Some("") => Selection::All,
            Some(v) if v.eq_ignore_ascii_case("all") || v.eq_ignore_ascii_case("todos") => {
                Selection::All
            }
            Some(v) => Selection::Only(v.to_string()),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "all"),
            Selection::Only(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_parse_accepts_only_three_tiers() {
        assert_eq!(Priority::parse(" High "), Some(Priority::High));
        assert_eq!(Priority::parse("low"), Some(Priority::Low));
        assert_eq!(Priority::parse("urgent"), None);
    }

    #[test]
    fn priority_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::Medium).unwrap(), "\"medium\"");
    }

    #[test]
    fn selection_treats_all_and_todos_as_everything() {
        assert!(Selection::from_input(Some("todos")).is_all());
        assert!(Selection::from_input(Some("ALL")).is_all());
        assert!(Selection::from_input(None).is_all());
        assert_eq!(
            Selection::from_input(Some("VIVO")),
            Selection::Only("VIVO".into())
        );
    }
}
