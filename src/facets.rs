//! Facet derivation for selection controls.
//!
//! Facet lists are sorted, distinct, and never contain blank values.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::fields::Selection;
use crate::hierarchy::GROUP_VOCABULARY;
use crate::task::Task;

/// Distinct non-blank values, sorted.
fn distinct<'a>(values: impl Iterator<Item = Option<&'a String>>) -> Vec<String> {
    values
        .flatten()
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn clients(tasks: &[Task]) -> Vec<String> {
    distinct(tasks.iter().map(|t| t.client.as_ref()))
}

/// The fixed vocabulary plus any other owner or execution groups seen in the data.
pub fn groups(tasks: &[Task]) -> Vec<String> {
    let mut set: BTreeSet<String> = GROUP_VOCABULARY.iter().map(|s| s.to_string()).collect();
    set.extend(distinct(tasks.iter().map(|t| t.owner_group.as_ref())));
    set.extend(distinct(tasks.iter().map(|t| t.execution_group.as_ref())));
    set.into_iter().collect()
}

/// Subgroups observed among tasks of the selected owner group.
pub fn subgroups(tasks: &[Task], group: &Selection) -> Vec<String> {
    distinct(
        tasks
            .iter()
            .filter(|t| match group {
                Selection::All => true,
                Selection::Only(g) => t.owner_group.as_ref() == Some(g),
            })
            .map(|t| t.owner_subgroup.as_ref()),
    )
}

/// One entry of an indented group/subgroup option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubgroupOption {
    pub label: String,
    /// Full "Group / Sub / ..." path; `None` for non-selectable parents.
    pub value: Option<String>,
    pub depth: usize,
}

#[derive(Default)]
struct Node {
    selectable: bool,
    children: BTreeMap<String, Node>,
}

/// Flatten every owner group and its subgroup paths into an indented tree.
///
/// Groups sit at depth 0 and are never selectable. Intermediate path
/// segments are selectable only if some task's subgroup ends there.
pub fn subgroup_tree(tasks: &[Task]) -> Vec<SubgroupOption> {
    let mut roots: BTreeMap<String, Node> = BTreeMap::new();
    for t in tasks {
        let (Some(group), Some(sub)) = (&t.owner_group, &t.owner_subgroup) else {
            continue;
        };
        let mut node = roots.entry(group.clone()).or_default();
        for segment in sub.split(" / ").map(str::trim).filter(|s| !s.is_empty()) {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.selectable = true;
    }

    let mut out = Vec::new();
    for (group, node) in &roots {
        out.push(SubgroupOption {
            label: group.clone(),
            value: None,
            depth: 0,
        });
        flatten(node, group, 1, &mut out);
    }
    out
}

fn flatten(node: &Node, path: &str, depth: usize, out: &mut Vec<SubgroupOption>) {
    for (label, child) in &node.children {
        let child_path = format!("{path} / {label}");
        out.push(SubgroupOption {
            label: label.clone(),
            value: child.selectable.then(|| child_path.clone()),
            depth,
        });
        flatten(child, &child_path, depth + 1, out);
    }
}

/// Render an option list with two-space indentation per level.
pub fn indent_label(option: &SubgroupOption) -> String {
    format!("{}{}", "  ".repeat(option.depth), option.label)
}
