//! # Taskboard - task dashboard CLI
//!
//! Loads task exports from a JSON file, an HTTP URL or a query service,
//! normalises their differing field conventions into one task model, and
//! offers filtered views of the result.
//!
//! ## Pipeline
//!
//! raw records → [`normalize`] (with a [`hierarchy`] policy and [`priority`]
//! inference) → [`store`] → [`filter`] → table, [`timeline`] feed or
//! [`export`] CSV.
//!
//! ## Quick Start
//!
//! ```bash
//! # Point at a data file once
//! taskboard config set json_url ./dados.json
//!
//! # Tasks of one client started in the last 30 days
//! taskboard list --days 30 --client VIVO
//!
//! # Filter options, with the group/subgroup tree
//! taskboard facets --tree
//!
//! # Export the current view
//! taskboard export --group Criação --subgroup "Criação / Design"
//!
//! # Timeline feed, one week ahead and zoomed in
//! taskboard timeline --shift 7 --zoom 1.3
//! ```
//!
//! Settings are stored in `~/.taskboard/settings.json`. Logging goes to
//! stderr and honours `RUST_LOG`.

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod cmd;
pub mod error;
pub mod export;
pub mod facets;
pub mod fields;
pub mod filter;
pub mod hierarchy;
pub mod normalize;
pub mod priority;
pub mod settings;
pub mod source;
pub mod store;
pub mod task;
pub mod timeline;

use cli::Cli;
use cmd::*;
use settings::{default_dir, Settings, SETTINGS_FILE};

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings_path = cli
        .settings
        .clone()
        .unwrap_or_else(|| default_dir().join(SETTINGS_FILE));

    // Per-run overrides are applied on top of the stored settings and never saved.
    let mut settings = Settings::load(&settings_path);
    if let Some(source) = cli.source {
        settings.json_url = source;
    }
    if let Some(kind) = cli.data_source {
        settings.data_source = kind;
    }
    if let Some(policy) = cli.policy {
        settings.hierarchy_policy = policy;
    }

    match cli.command {
        Commands::List { filters, limit } => cmd_list(&settings, filters, limit),

        Commands::Facets { group, tree } => cmd_facets(&settings, group, tree),

        Commands::Timeline { filters, group_by, shift, today, zoom } =>
            cmd_timeline(&settings, filters, group_by, shift, today, zoom),

        Commands::Export { filters, output } => cmd_export(&settings, filters, output),

        Commands::Config { action } => cmd_config(&settings_path, action),

        Commands::Completions { shell } => cmd_completions(shell),
    }
}
