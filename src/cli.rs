use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::cmd::Commands;
use crate::fields::{DataSourceKind, HierarchyPolicyKind};

/// Task dashboard over JSON or query-service task exports.
/// Settings default to ~/.taskboard/settings.json or a path passed via --settings.
#[derive(Parser)]
#[command(name = "taskboard", version, about = "Filter, chart and export task dashboards")]
pub struct Cli {
    /// Path to the settings file.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Data source location for this run (file path or http(s) URL).
    #[arg(long, global = true)]
    pub source: Option<String>,

    /// Data source kind for this run: json | bigquery.
    #[arg(long, global = true, value_enum)]
    pub data_source: Option<DataSourceKind>,

    /// Group path policy for this run: positional | vocabulary.
    #[arg(long, global = true, value_enum)]
    pub policy: Option<HierarchyPolicyKind>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}
