//! Persistent user settings.
//!
//! Settings live in a small JSON file (by default `~/.taskboard/settings.json`).
//! Missing files and missing keys fall back to defaults; writes go through a
//! temp file and rename.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{DashboardError, Result};
use crate::fields::{DataSourceKind, HierarchyPolicyKind};

pub const SETTINGS_FILE: &str = "settings.json";

/// Names accepted by `config set`.
pub const KEYS: [&str; 6] = [
    "data_source",
    "json_url",
    "project_id",
    "dataset",
    "table",
    "hierarchy_policy",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_source: DataSourceKind,
    pub json_url: String,
    pub project_id: String,
    pub dataset: String,
    pub table: String,
    pub hierarchy_policy: HierarchyPolicyKind,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_source: DataSourceKind::Json,
            json_url: "dados.json".into(),
            project_id: "monday-export".into(),
            dataset: "taskrow_views".into(),
            table: "CJT_RD_RTC".into(),
            hierarchy_policy: HierarchyPolicyKind::Positional,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when the file is absent or unreadable.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Settings::default();
        }
        match fs::read_to_string(path) {
            Ok(buf) => match serde_json::from_str(&buf) {
                Ok(s) => s,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt settings file, using defaults");
                    Settings::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable settings file, using defaults");
                Settings::default()
            }
        }
    }

    /// Save settings atomically (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Update one key from its textual value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = || DashboardError::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "data_source" => self.data_source = value.parse().map_err(|_| invalid())?,
            "hierarchy_policy" => self.hierarchy_policy = value.parse().map_err(|_| invalid())?,
            "json_url" | "project_id" | "dataset" | "table" if value.trim().is_empty() => {
                return Err(invalid());
            }
            "json_url" => self.json_url = value.trim().to_string(),
            "project_id" => self.project_id = value.trim().to_string(),
            "dataset" => self.dataset = value.trim().to_string(),
            "table" => self.table = value.trim().to_string(),
            other => return Err(DashboardError::UnknownSetting(other.to_string())),
        }
        Ok(())
    }

    /// Key/value pairs for display.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("data_source", self.data_source.as_str().to_string()),
            ("json_url", self.json_url.clone()),
            ("project_id", self.project_id.clone()),
            ("dataset", self.dataset.clone()),
            ("table", self.table.clone()),
            ("hierarchy_policy", self.hierarchy_policy.as_str().to_string()),
        ]
    }
}

/// Directory holding the settings file: `$HOME/.taskboard`, or `./.taskboard`.
pub fn default_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".taskboard")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load(&dir.path().join(SETTINGS_FILE));
        assert_eq!(s, Settings::default());
        assert_eq!(s.json_url, "dados.json");
    }

    #[test]
    fn missing_keys_fall_back_individually() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, r#"{"json_url": "https://example.org/t.json", "data_source": "bigquery"}"#).unwrap();
        let s = Settings::load(&path);
        assert_eq!(s.json_url, "https://example.org/t.json");
        assert_eq!(s.data_source, DataSourceKind::Bigquery);
        assert_eq!(s.table, "CJT_RD_RTC");
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "{not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn set_then_save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);
        let mut s = Settings::default();
        s.set("hierarchy_policy", "vocabulary").unwrap();
        s.set("dataset", "other_views").unwrap();
        s.save(&path).unwrap();
        let loaded = Settings::load(&path);
        assert_eq!(loaded.hierarchy_policy, HierarchyPolicyKind::Vocabulary);
        assert_eq!(loaded.dataset, "other_views");
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut s = Settings::default();
        assert!(matches!(s.set("colour", "red"), Err(DashboardError::UnknownSetting(_))));
        assert!(matches!(s.set("data_source", "csv"), Err(DashboardError::InvalidSetting { .. })));
        assert!(matches!(s.set("table", " "), Err(DashboardError::InvalidSetting { .. })));
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn entries_list_every_key() {
        let keys: Vec<&str> = Settings::default().entries().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, KEYS.to_vec());
    }
}
