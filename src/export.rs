//! CSV export of the filtered task view.

use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::error::{DashboardError, Result};
use crate::store::format_day;
use crate::task::Task;

pub const HEADERS: [&str; 10] = [
    "Cliente",
    "Projeto",
    "Tarefa",
    "Data Início",
    "Data Fim",
    "Responsável",
    "Grupo",
    "Subgrupo",
    "Membro",
    "Prioridade",
];

const MISSING: &str = "N/A";

/// Wrap a field in double quotes, doubling any embedded quote.
fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn or_missing(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or(MISSING)
}

fn row(task: &Task) -> [String; 10] {
    [
        or_missing(&task.client).to_string(),
        or_missing(&task.project).to_string(),
        task.title.clone(),
        format_day(task.start_date),
        format_day(task.end_date),
        or_missing(&task.responsible).to_string(),
        or_missing(&task.owner_group).to_string(),
        or_missing(&task.owner_subgroup).to_string(),
        or_missing(&task.owner_member).to_string(),
        task.priority.label().to_string(),
    ]
}

/// Build the CSV document: header plus one line per task, newline-separated.
pub fn to_csv(tasks: &[&Task]) -> String {
    let header = HEADERS.iter().map(|h| quote(h)).collect::<Vec<_>>().join(",");
    let lines = tasks
        .iter()
        .map(|t| row(t).iter().map(|c| quote(c)).collect::<Vec<_>>().join(","));
    std::iter::once(header)
        .chain(lines)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Download name for an export produced on `today`.
pub fn default_file_name(today: NaiveDate) -> String {
    format!("tarefas_{}.csv", today.format("%Y-%m-%d"))
}

/// Write the CSV document for `tasks` to `path`.
pub fn write_csv(tasks: &[&Task], path: &Path) -> Result<()> {
    std::fs::write(path, to_csv(tasks)).map_err(|source| DashboardError::Export {
        path: path.display().to_string(),
        source,
    })?;
    info!(count = tasks.len(), path = %path.display(), "exported tasks to CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Priority;
    use crate::store::tests::task;

    #[test]
    fn two_tasks_give_three_quoted_lines() {
        let mut a = task(0, "2025-06-01");
        a.client = Some("VIVO".into());
        a.priority = Priority::High;
        let mut b = task(1, "2025-06-02");
        b.title = "Say \"hi\"".into();

        let csv = to_csv(&[&a, &b]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in &lines {
            for field in line.split("\",\"") {
                assert!(!field.is_empty());
            }
            assert!(line.starts_with('"') && line.ends_with('"'));
        }
        assert!(lines[1].starts_with("\"VIVO\",\"N/A\",\"task 0\",\"01/06/2025\""));
        assert!(lines[1].ends_with("\"Alta\""));
        assert!(lines[2].contains("\"Say \"\"hi\"\"\""));
    }

    #[test]
    fn file_name_carries_date() {
        let d = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(default_file_name(d), "tarefas_2025-06-15.csv");
    }

    #[test]
    fn write_csv_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let t = task(0, "2025-06-01");
        write_csv(&[&t], &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 2);
    }
}
