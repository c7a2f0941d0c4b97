//! Cascading task filters.
//!
//! Predicates run in a fixed order (recency, client, group, subgroup) and the
//! result keeps the original relative order of tasks.

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::facets;
use crate::fields::Selection;
use crate::store::TaskStore;
use crate::task::Task;

/// Recency window applied when none is chosen.
pub const DEFAULT_DAYS_BACK: i64 = 90;

/// User-selected filter values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub days_back: i64,
    pub client: Selection,
    pub group: Selection,
    pub subgroup: Selection,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            days_back: DEFAULT_DAYS_BACK,
            client: Selection::All,
            group: Selection::All,
            subgroup: Selection::All,
        }
    }
}

impl FilterCriteria {
    /// Earliest start date that still passes the recency filter.
    ///
    /// Windows reaching past the representable range start at `NaiveDateTime::MIN`.
    pub fn min_date(&self, now: NaiveDateTime) -> NaiveDateTime {
        Duration::try_days(self.days_back)
            .and_then(|d| now.checked_sub_signed(d))
            .unwrap_or(NaiveDateTime::MIN)
    }

    pub fn matches(&self, task: &Task, min_date: NaiveDateTime) -> bool {
        if task.invalid_start || task.start_date < min_date {
            return false;
        }
        if let Selection::Only(ref c) = self.client {
            if task.client.as_ref() != Some(c) {
                return false;
            }
        }
        if let Selection::Only(ref g) = self.group {
            if task.execution_group.as_ref() != Some(g) && task.owner_group.as_ref() != Some(g) {
                return false;
            }
        }
        if let Selection::Only(ref s) = self.subgroup {
            let direct = task.owner_subgroup.as_ref() == Some(s);
            let full_path = task.owner_subgroup.is_some() && task.group_path().as_ref() == Some(s);
            if !direct && !full_path {
                return false;
            }
        }
        true
    }
}

/// Indices of tasks passing every predicate, in original order.
pub fn apply_filters(tasks: &[Task], criteria: &FilterCriteria, now: NaiveDateTime) -> Vec<usize> {
    let min_date = criteria.min_date(now);
    let out: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| criteria.matches(t, min_date))
        .map(|(i, _)| i)
        .collect();
    debug!(total = tasks.len(), kept = out.len(), "applied filters");
    out
}

/// Recompute the store's filtered subset from its full collection.
pub fn refresh(store: &mut TaskStore, criteria: &FilterCriteria, now: NaiveDateTime) {
    let indices = apply_filters(store.tasks(), criteria, now);
    store.set_filtered(indices);
}

/// Filter criteria together with the subgroup options they currently allow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub criteria: FilterCriteria,
    pub subgroup_options: Vec<String>,
    /// "Group / Subgroup" paths present in the collection.
    observed_paths: Vec<String>,
}

impl FilterState {
    /// Initial state for a freshly loaded collection.
    pub fn new(tasks: &[Task], criteria: FilterCriteria) -> Self {
        let subgroup_options = facets::subgroups(tasks, &criteria.group);
        let mut observed_paths: Vec<String> = tasks
            .iter()
            .filter(|t| t.owner_subgroup.is_some())
            .filter_map(Task::group_path)
            .collect();
        observed_paths.sort();
        observed_paths.dedup();
        Self {
            criteria,
            subgroup_options,
            observed_paths,
        }
    }

    /// Change the group; subgroup options are recomputed and the subgroup reset.
    pub fn with_group(self, tasks: &[Task], group: Selection) -> Self {
        let criteria = FilterCriteria {
            group,
            subgroup: Selection::All,
            ..self.criteria
        };
        Self::new(tasks, criteria)
    }

    /// Change the subgroup. Values outside the current options fall back to all.
    pub fn with_subgroup(mut self, subgroup: Selection) -> Self {
        self.criteria.subgroup = match subgroup {
            Selection::Only(ref s) if !self.accepts_subgroup(s) => Selection::All,
            other => other,
        };
        self
    }

    fn accepts_subgroup(&self, s: &str) -> bool {
        if self.subgroup_options.iter().any(|o| o == s) {
            return true;
        }
        match &self.criteria.group {
            Selection::Only(g) => self.subgroup_options.iter().any(|o| format!("{g} / {o}") == s),
            Selection::All => self.observed_paths.iter().any(|p| p == s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::PositionalPolicy;
    use crate::normalize::{parse_date, Normalizer};
    use crate::store::tests::task;
    use serde_json::json;

    fn now() -> NaiveDateTime {
        parse_date("2025-06-15T12:00:00").unwrap()
    }

    fn days_ago(id: usize, days: i64) -> Task {
        let mut t = task(id, "2025-01-01");
        t.start_date = now() - Duration::days(days);
        t.end_date = t.start_date;
        t
    }

    fn grouped(id: usize, client: &str, group: &str, exec: &str, sub: Option<&str>) -> Task {
        let mut t = days_ago(id, 1);
        t.client = Some(client.into());
        t.owner_group = Some(group.into());
        t.execution_group = Some(exec.into());
        t.owner_subgroup = sub.map(String::from);
        t
    }

    fn sample() -> Vec<Task> {
        vec![
            grouped(0, "VIVO", "Criação", "Criação", Some("Design")),
            grouped(1, "RD", "Criação", "Mídia", Some("Redação")),
            grouped(2, "VIVO", "BI", "BI", None),
            grouped(3, "VIVO", "Mídia", "Mídia", Some("Social")),
        ]
    }

    #[test]
    fn recency_excludes_only_older_tasks() {
        let tasks = vec![days_ago(0, 40), days_ago(1, 95), days_ago(2, 10)];
        let kept = apply_filters(&tasks, &FilterCriteria::default(), now());
        assert_eq!(kept, vec![0, 2]);
    }

    #[test]
    fn unparseable_start_never_passes_recency() {
        let normalizer = Normalizer::new(Box::new(PositionalPolicy), now());
        let tasks = normalizer
            .normalize_batch(vec![
                json!({"name": "bad", "start": "not-a-date"}),
                json!({"name": "undated"}),
            ])
            .unwrap();
        let criteria = FilterCriteria {
            days_back: 1,
            ..Default::default()
        };
        assert_eq!(apply_filters(&tasks, &criteria, now()), vec![1]);
    }

    #[test]
    fn huge_recency_window_does_not_overflow() {
        let criteria = FilterCriteria {
            days_back: 1_000_000_000,
            ..Default::default()
        };
        assert_eq!(criteria.min_date(now()), NaiveDateTime::MIN);
        assert_eq!(apply_filters(&[days_ago(0, 5000)], &criteria, now()), vec![0]);

        let criteria = FilterCriteria {
            days_back: i64::MIN,
            ..Default::default()
        };
        assert_eq!(criteria.min_date(now()), NaiveDateTime::MIN);
    }

    #[test]
    fn client_and_group_match_owner_or_execution() {
        let criteria = FilterCriteria {
            client: Selection::Only("VIVO".into()),
            group: Selection::Only("Mídia".into()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&sample(), &criteria, now()), vec![3]);

        let criteria = FilterCriteria {
            group: Selection::Only("Mídia".into()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&sample(), &criteria, now()), vec![1, 3]);
    }

    #[test]
    fn subgroup_matches_plain_or_full_path() {
        let plain = FilterCriteria {
            subgroup: Selection::Only("Design".into()),
            ..Default::default()
        };
        let full = FilterCriteria {
            subgroup: Selection::Only("Criação / Design".into()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&sample(), &plain, now()), vec![0]);
        assert_eq!(apply_filters(&sample(), &full, now()), vec![0]);

        let group_only = FilterCriteria {
            subgroup: Selection::Only("BI".into()),
            ..Default::default()
        };
        assert!(apply_filters(&sample(), &group_only, now()).is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let tasks = sample();
        let mut store = TaskStore::default();
        let ticket = store.begin_load();
        store.commit(ticket, tasks.clone());
        let criteria = FilterCriteria {
            client: Selection::Only("VIVO".into()),
            ..Default::default()
        };
        refresh(&mut store, &criteria, now());
        let first: Vec<Task> = store.filtered().into_iter().cloned().collect();
        refresh(&mut store, &criteria, now());
        let second: Vec<Task> = store.filtered().into_iter().cloned().collect();
        assert_eq!(first, second);
        assert_eq!(store.tasks(), tasks.as_slice());
    }

    #[test]
    fn changing_group_resets_subgroup_and_restores_options() {
        let tasks = sample();
        let state = FilterState::new(&tasks, FilterCriteria::default());
        let all_options = state.subgroup_options.clone();
        assert_eq!(all_options, vec!["Design", "Redação", "Social"]);

        let state = state
            .with_group(&tasks, Selection::Only("Criação".into()))
            .with_subgroup(Selection::Only("Design".into()));
        assert_eq!(state.subgroup_options, vec!["Design", "Redação"]);
        assert_eq!(state.criteria.subgroup, Selection::Only("Design".into()));

        let state = state.with_group(&tasks, Selection::All);
        assert_eq!(state.criteria.subgroup, Selection::All);
        assert_eq!(state.subgroup_options, all_options);
    }

    #[test]
    fn subgroup_outside_options_falls_back_to_all() {
        let tasks = sample();
        let state = FilterState::new(&tasks, FilterCriteria::default())
            .with_group(&tasks, Selection::Only("BI".into()))
            .with_subgroup(Selection::Only("Design".into()));
        assert_eq!(state.criteria.subgroup, Selection::All);

        let state = FilterState::new(&tasks, FilterCriteria::default())
            .with_group(&tasks, Selection::Only("Criação".into()))
            .with_subgroup(Selection::Only("Criação / Redação".into()));
        assert_eq!(state.criteria.subgroup, Selection::Only("Criação / Redação".into()));
    }

    #[test]
    fn full_path_without_group_must_be_observed() {
        let tasks = sample();
        let state = FilterState::new(&tasks, FilterCriteria::default())
            .with_subgroup(Selection::Only("Nope / Design".into()));
        assert_eq!(state.criteria.subgroup, Selection::All);

        let state = FilterState::new(&tasks, FilterCriteria::default())
            .with_subgroup(Selection::Only("Mídia / Social".into()));
        assert_eq!(state.criteria.subgroup, Selection::Only("Mídia / Social".into()));
    }
}
