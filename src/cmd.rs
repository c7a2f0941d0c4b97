//! Command implementations for the CLI interface.
//!
//! Each handler loads the configured data source into a fresh task store,
//! applies the requested filters and prints or writes its view. Load errors
//! are reported once and end the command with a non-zero exit code.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use clap::{Args, Subcommand};
use clap_complete::{generate, Shell};
use tracing::{error, warn};

use crate::export::{default_file_name, write_csv};
use crate::facets;
use crate::fields::{Selection, TimelineGrouping};
use crate::filter::{refresh, FilterCriteria, FilterState, DEFAULT_DAYS_BACK};
use crate::settings::{Settings, KEYS};
use crate::source::{load_into, HttpQueryClient};
use crate::store::{print_table, TaskStore};
use crate::timeline::{self, TimelineWindow};

#[derive(Subcommand)]
pub enum Commands {
    /// List the filtered tasks as a table.
    List {
        #[command(flatten)]
        filters: FilterArgs,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show the values available to each filter.
    Facets {
        /// Restrict subgroup options to this group.
        #[arg(long)]
        group: Option<String>,
        /// Print the indented group/subgroup tree instead of flat subgroups.
        #[arg(long)]
        tree: bool,
    },

    /// Emit the timeline feed (items, groups, window) as JSON.
    Timeline {
        #[command(flatten)]
        filters: FilterArgs,
        /// Swimlane key: member | execution-group.
        #[arg(long, value_enum, default_value_t = TimelineGrouping::Member)]
        group_by: TimelineGrouping,
        /// Move the window by this many days (negative moves back).
        #[arg(long, allow_hyphen_values = true)]
        shift: Option<i64>,
        /// Centre the window on the current time.
        #[arg(long)]
        today: bool,
        /// Zoom factor; above 1 zooms in (e.g. 1.3), below 1 zooms out (e.g. 0.7).
        #[arg(long)]
        zoom: Option<f64>,
    },

    /// Export the filtered tasks to CSV.
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output file path (default: tarefas_<date>.csv)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show or change persistent settings.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print every setting.
    Show,
    /// Set one setting and save it.
    Set {
        /// data_source | json_url | project_id | dataset | table | hierarchy_policy
        key: String,
        value: String,
    },
    /// Print the settings file location.
    Path,
}

/// Filter flags shared by the task views.
#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Only tasks started within this many days.
    #[arg(long, default_value_t = DEFAULT_DAYS_BACK)]
    pub days: i64,
    /// Client, or "all".
    #[arg(long)]
    pub client: Option<String>,
    /// Owner or execution group, or "all".
    #[arg(long)]
    pub group: Option<String>,
    /// Subgroup name or full "Group / Subgroup" path, or "all".
    #[arg(long)]
    pub subgroup: Option<String>,
}

impl FilterArgs {
    /// Resolve the flags through the cascading selection rules.
    pub fn state(&self, store: &TaskStore) -> FilterState {
        let criteria = FilterCriteria {
            days_back: self.days,
            client: Selection::from_input(self.client.as_deref()),
            ..Default::default()
        };
        let requested = Selection::from_input(self.subgroup.as_deref());
        let state = FilterState::new(store.tasks(), criteria)
            .with_group(store.tasks(), Selection::from_input(self.group.as_deref()))
            .with_subgroup(requested.clone());
        if state.criteria.subgroup != requested {
            warn!(subgroup = %requested, group = %state.criteria.group, "subgroup not in selected group, showing all");
        }
        state
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Load the configured source, or report the failure and exit.
fn load_or_exit(settings: &Settings, now: NaiveDateTime) -> TaskStore {
    let mut store = TaskStore::default();
    let client = HttpQueryClient::from_env();
    if let Err(e) = load_into(&mut store, settings, &client, now) {
        error!(error = %e, "failed to load tasks");
        eprintln!("Error loading data: {e}");
        std::process::exit(1);
    }
    store
}

/// Load and filter in one step.
fn filtered_store(settings: &Settings, filters: &FilterArgs, now: NaiveDateTime) -> TaskStore {
    let mut store = load_or_exit(settings, now);
    let state = filters.state(&store);
    refresh(&mut store, &state.criteria, now);
    store
}

/// Print the filtered task table.
pub fn cmd_list(settings: &Settings, filters: FilterArgs, limit: Option<usize>) {
    let store = filtered_store(settings, &filters, now());
    let mut tasks = store.filtered();
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    if let Some(n) = limit {
        tasks.truncate(n);
    }
    print_table(&tasks);
}

/// Print clients, groups and subgroup options.
pub fn cmd_facets(settings: &Settings, group: Option<String>, tree: bool) {
    let store = load_or_exit(settings, now());
    let tasks = store.tasks();

    println!("Clients:");
    for c in facets::clients(tasks) {
        println!("  {c}");
    }
    println!("Groups:");
    for g in facets::groups(tasks) {
        println!("  {g}");
    }

    if tree {
        println!("Subgroups:");
        for option in facets::subgroup_tree(tasks) {
            let marker = if option.value.is_some() { "" } else { " (group)" };
            println!("  {}{}", facets::indent_label(&option), marker);
        }
    } else {
        let selection = Selection::from_input(group.as_deref());
        println!("Subgroups ({selection}):");
        for s in facets::subgroups(tasks, &selection) {
            println!("  {s}");
        }
    }
}

/// Print the timeline feed as JSON.
pub fn cmd_timeline(
    settings: &Settings,
    filters: FilterArgs,
    group_by: TimelineGrouping,
    shift: Option<i64>,
    today: bool,
    zoom: Option<f64>,
) {
    let now = now();
    let store = filtered_store(settings, &filters, now);

    let mut window = TimelineWindow::around(now);
    if let Some(days) = shift {
        window = window.shift(days);
    }
    if today {
        window = window.centre_on(now);
    }
    if let Some(factor) = zoom {
        window = window.zoom(factor);
    }

    let feed = timeline::build(&store.filtered(), group_by, window);
    match serde_json::to_string_pretty(&feed) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to encode timeline: {e}");
            std::process::exit(1);
        }
    }
}

/// Write the filtered tasks to CSV.
pub fn cmd_export(settings: &Settings, filters: FilterArgs, output: Option<PathBuf>) {
    let now = now();
    let store = filtered_store(settings, &filters, now);
    let tasks = store.filtered();
    if tasks.is_empty() {
        println!("No data to export.");
        return;
    }
    let path = output.unwrap_or_else(|| PathBuf::from(default_file_name(now.date())));
    match write_csv(&tasks, &path) {
        Ok(()) => println!("Exported {} task(s) to {}", tasks.len(), path.display()),
        Err(e) => {
            error!(error = %e, "export failed");
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// Show or update persistent settings.
pub fn cmd_config(settings_path: &Path, action: ConfigAction) {
    let mut settings = Settings::load(settings_path);
    match action {
        ConfigAction::Show => {
            for (key, value) in settings.entries() {
                println!("{key:<18} {value}");
            }
        }
        ConfigAction::Set { key, value } => {
            if let Err(e) = settings.set(&key, &value).and_then(|_| settings.save(settings_path)) {
                eprintln!("{e}");
                eprintln!("Valid keys: {}", KEYS.join(", "));
                std::process::exit(1);
            }
            println!("Set {key} = {value}");
        }
        ConfigAction::Path => println!("{}", settings_path.display()),
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
