//! Feed for the timeline renderer and the window navigation it exposes.
//!
//! The renderer itself is external; this module shapes tasks into items and
//! swimlane groups, and does the window arithmetic behind the navigation
//! controls.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::fields::TimelineGrouping;
use crate::store::format_day;
use crate::task::Task;

/// Characters of the title shown on an item before it is cut.
pub const LABEL_BUDGET: usize = 25;

const UNGROUPED: &str = "Sem grupo";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineItem {
    pub id: usize,
    pub content: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub group: String,
    pub title: String,
    #[serde(rename = "className")]
    pub class_name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineGroup {
    pub id: String,
    pub content: String,
}

/// Everything the renderer needs for one draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineFeed {
    pub items: Vec<TimelineItem>,
    pub groups: Vec<TimelineGroup>,
    pub window: TimelineWindow,
}

/// Title cut to the label budget, with "..." when shortened.
pub fn label(title: &str) -> String {
    if title.chars().count() > LABEL_BUDGET {
        let cut: String = title.chars().take(LABEL_BUDGET).collect();
        format!("{cut}...")
    } else {
        title.to_string()
    }
}

fn group_key(task: &Task, grouping: TimelineGrouping) -> String {
    let key = match grouping {
        TimelineGrouping::Member => task
            .owner_member
            .as_ref()
            .or(task.owner_subgroup.as_ref())
            .or(task.owner_group.as_ref()),
        TimelineGrouping::ExecutionGroup => {
            task.execution_group.as_ref().or(task.owner_group.as_ref())
        }
    };
    key.cloned().unwrap_or_else(|| UNGROUPED.to_string())
}

fn tooltip(task: &Task) -> String {
    let na = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".into());
    [
        task.title.clone(),
        format!("Cliente: {}", na(&task.client)),
        format!("Responsável: {}", na(&task.responsible)),
        format!(
            "Período: {} - {}",
            format_day(task.start_date),
            format_day(task.end_date)
        ),
        format!("Status: {}", na(&task.status)),
        format!("Grupo: {}", task.group_path().unwrap_or_default()),
    ]
    .join("\n")
}

pub fn item(task: &Task, grouping: TimelineGrouping) -> TimelineItem {
    TimelineItem {
        id: task.id,
        content: label(&task.title),
        start: task.start_date,
        end: task.end_date,
        group: group_key(task, grouping),
        title: tooltip(task),
        class_name: task.priority.css_class(),
    }
}

/// Build items and the sorted, distinct group list for `tasks`.
pub fn build(tasks: &[&Task], grouping: TimelineGrouping, window: TimelineWindow) -> TimelineFeed {
    let items: Vec<TimelineItem> = tasks.iter().map(|t| item(t, grouping)).collect();
    let groups = items
        .iter()
        .map(|i| i.group.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|g| TimelineGroup {
            id: g.clone(),
            content: g,
        })
        .collect();
    TimelineFeed {
        items,
        groups,
        window,
    }
}

/// Visible range of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimelineWindow {
    pub fn min_span() -> Duration {
        Duration::days(7)
    }

    pub fn max_span() -> Duration {
        Duration::days(180)
    }

    /// One week back to two weeks ahead of `now`.
    pub fn around(now: NaiveDateTime) -> Self {
        Self {
            start: now - Duration::weeks(1),
            end: now + Duration::weeks(2),
        }
    }

    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    fn centre(&self) -> NaiveDateTime {
        self.start + self.span() / 2
    }

    fn with_span(centre: NaiveDateTime, span: Duration) -> Self {
        let span = span.clamp(Self::min_span(), Self::max_span());
        let half = span / 2;
        Self {
            start: centre - half,
            end: centre - half + span,
        }
    }

    /// Move both edges by `days` (negative moves back).
    ///
    /// A shift past the representable date range leaves the window unchanged.
    pub fn shift(self, days: i64) -> Self {
        let Some(delta) = Duration::try_days(days) else {
            return self;
        };
        match (
            self.start.checked_add_signed(delta),
            self.end.checked_add_signed(delta),
        ) {
            (Some(start), Some(end)) => Self { start, end },
            _ => self,
        }
    }

    /// Keep the width, centre on `now`.
    pub fn centre_on(self, now: NaiveDateTime) -> Self {
        Self::with_span(now, self.span())
    }

    /// Divide the width by `factor` around the centre; >1 zooms in.
    pub fn zoom(self, factor: f64) -> Self {
        if !factor.is_finite() || factor <= 0.0 {
            return self;
        }
        let millis = (self.span().num_milliseconds() as f64 / factor).round() as i64;
        Self::with_span(self.centre(), Duration::milliseconds(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Priority;
    use crate::normalize::parse_date;
    use crate::store::tests::task;

    fn now() -> NaiveDateTime {
        parse_date("2025-06-15T12:00:00").unwrap()
    }

    #[test]
    fn label_cuts_long_titles() {
        assert_eq!(label("short"), "short");
        let long = "a".repeat(30);
        assert_eq!(label(&long), format!("{}...", "a".repeat(25)));
    }

    #[test]
    fn items_carry_priority_class_and_group() {
        let mut t = task(7, "2025-06-01");
        t.priority = Priority::High;
        t.owner_group = Some("Criação".into());
        t.owner_member = Some("Jane".into());
        t.execution_group = Some("Mídia".into());

        let by_member = item(&t, TimelineGrouping::Member);
        assert_eq!(by_member.id, 7);
        assert_eq!(by_member.group, "Jane");
        assert_eq!(by_member.class_name, "task-priority-high");
        assert!(by_member.title.contains("Grupo: Criação"));

        assert_eq!(item(&t, TimelineGrouping::ExecutionGroup).group, "Mídia");
        assert_eq!(item(&task(1, "2025-06-01"), TimelineGrouping::Member).group, "Sem grupo");
    }

    #[test]
    fn groups_are_distinct_and_sorted() {
        let mut a = task(0, "2025-06-01");
        a.owner_member = Some("Zé".into());
        let mut b = task(1, "2025-06-01");
        b.owner_member = Some("Ana".into());
        let mut c = task(2, "2025-06-01");
        c.owner_member = Some("Zé".into());
        let feed = build(&[&a, &b, &c], TimelineGrouping::Member, TimelineWindow::around(now()));
        let ids: Vec<&str> = feed.groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["Ana", "Zé"]);
        assert_eq!(feed.items.len(), 3);
    }

    #[test]
    fn window_navigation() {
        let w = TimelineWindow::around(now());
        assert_eq!(w.span(), Duration::days(21));

        let shifted = w.shift(7);
        assert_eq!(shifted.start, w.start + Duration::days(7));
        assert_eq!(shifted.span(), w.span());

        let centred = shifted.centre_on(now());
        assert_eq!(centred.span(), w.span());
        assert_eq!(centred.start + centred.span() / 2, now());

        let zoomed = w.zoom(1.5);
        assert_eq!(zoomed.span(), Duration::days(14));
    }

    #[test]
    fn out_of_range_shift_keeps_window() {
        let w = TimelineWindow::around(now());
        assert_eq!(w.shift(1_000_000_000), w);
        assert_eq!(w.shift(-1_000_000_000), w);
        assert_eq!(w.shift(i64::MAX), w);
    }

    #[test]
    fn zoom_is_clamped() {
        let w = TimelineWindow::around(now());
        assert_eq!(w.zoom(100.0).span(), TimelineWindow::min_span());
        assert_eq!(w.zoom(0.01).span(), TimelineWindow::max_span());
        assert_eq!(w.zoom(0.0), w);
    }
}
