//! Task store and table formatting helpers.
//!
//! The store owns the full normalised collection and the indices of the
//! current filtered subset. The full collection is replaced wholesale on every
//! committed load; the subset is recomputed, never edited in place.

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::task::Task;

/// Issued when a load starts; only the newest ticket may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// In-memory collection of tasks for one session.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    filtered: Vec<usize>,
    issued: u64,
    committed: u64,
    loading: bool,
}

impl TaskStore {
    /// Start a new load, superseding any load still in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        self.loading = true;
        LoadTicket(self.issued)
    }

    /// Replace the collection with a load result unless a newer load was started.
    ///
    /// Returns `false` and keeps the current data when the ticket is stale.
    pub fn commit(&mut self, ticket: LoadTicket, tasks: Vec<Task>) -> bool {
        if ticket.0 != self.issued {
            warn!(
                ticket = ticket.0,
                newest = self.issued,
                "discarding result of superseded load"
            );
            return false;
        }
        debug!(count = tasks.len(), generation = ticket.0, "committed task load");
        self.filtered = (0..tasks.len()).collect();
        self.tasks = tasks;
        self.committed = ticket.0;
        self.loading = false;
        true
    }

    /// Close a failed load; previously committed data stays in place.
    pub fn abandon(&mut self, ticket: LoadTicket) {
        if ticket.0 == self.issued {
            self.loading = false;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Generation of the data currently held (0 before the first load).
    pub fn generation(&self) -> u64 {
        self.committed
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Store a freshly computed subset, given as indices into the full collection.
    pub fn set_filtered(&mut self, indices: Vec<usize>) {
        self.filtered = indices;
    }

    pub fn filtered(&self) -> Vec<&Task> {
        self.filtered.iter().filter_map(|&i| self.tasks.get(i)).collect()
    }
}

/// Truncate a string to a maximum width, adding an ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Day-first date as shown to users.
pub fn format_day(dt: NaiveDateTime) -> String {
    dt.format("%d/%m/%Y").to_string()
}

/// Print tasks as an aligned table.
pub fn print_table(tasks: &[&Task]) {
    println!(
        "{:<5} {:<12} {:<10} {:<10} {:<7} {:<24} {}",
        "ID", "Client", "Start", "End", "Pri", "Group", "Title"
    );
    for t in tasks {
        let client = t.client.clone().unwrap_or_else(|| "-".into());
        let group = t.group_path().unwrap_or_else(|| "-".into());
        println!(
            "{:<5} {:<12} {:<10} {:<10} {:<7} {:<24} {}",
            t.id,
            truncate(&client, 12),
            format_day(t.start_date),
            format_day(t.end_date),
            t.priority.as_str(),
            truncate(&group, 24),
            t.title
        );
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fields::Priority;
    use crate::normalize::parse_date;

    /// Minimal task used by tests across modules.
    pub(crate) fn task(id: usize, start: &str) -> Task {
        let start = parse_date(start).unwrap();
        Task {
            id,
            client: None,
            title: format!("task {id}"),
            start_date: start,
            invalid_start: false,
            end_date: start,
            due_date: start,
            responsible: None,
            owner_group: None,
            owner_subgroup: None,
            owner_member: None,
            execution_group: None,
            status: None,
            priority: Priority::Medium,
            project: None,
            kind: None,
            number: None,
        }
    }

    #[test]
    fn stale_load_cannot_overwrite_newer_one() {
        let mut store = TaskStore::default();
        let first = store.begin_load();
        let second = store.begin_load();

        assert!(store.commit(second, vec![task(0, "2025-01-01"), task(1, "2025-01-02")]));
        assert!(!store.commit(first, vec![task(0, "2024-01-01")]));
        assert_eq!(store.tasks().len(), 2);
        assert_eq!(store.generation(), 2);
        assert!(!store.is_loading());
    }

    #[test]
    fn commit_replaces_rather_than_merges() {
        let mut store = TaskStore::default();
        let t = store.begin_load();
        store.commit(t, vec![task(0, "2025-01-01"), task(1, "2025-01-02")]);
        let t = store.begin_load();
        store.commit(t, vec![task(0, "2025-02-01")]);
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.filtered().len(), 1);
    }

    #[test]
    fn abandoned_load_keeps_previous_data() {
        let mut store = TaskStore::default();
        let t = store.begin_load();
        store.commit(t, vec![task(0, "2025-01-01")]);
        let failed = store.begin_load();
        assert!(store.is_loading());
        store.abandon(failed);
        assert!(!store.is_loading());
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
