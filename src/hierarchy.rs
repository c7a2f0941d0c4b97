//! Group hierarchy decoding.
//!
//! Owner paths such as `"Criação / Design / Jane"` are split into group,
//! subgroup and member levels. Two policies exist behind one trait: the
//! positional policy reads levels by position, the vocabulary policy anchors
//! the group on a closed set of business-unit names.

use crate::fields::HierarchyPolicyKind;

/// Known top-level business units.
pub const GROUP_VOCABULARY: &[&str] = &["Criação", "BI", "Operações", "Produção", "Mídia"];

/// Group used when no vocabulary entry matches.
pub const FALLBACK_GROUP: &str = "Outros";

/// Group that absorbs single-person paths and the legacy correction.
pub const PRODUCTION_GROUP: &str = "Produção";

/// A person name that older exports placed at the group level.
pub const LEGACY_GROUP_NAME: &str = "Ana Luisa Andre";

/// Decoded owner levels. Absent levels are `None`, never empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerLevels {
    pub group: Option<String>,
    pub subgroup: Option<String>,
    pub member: Option<String>,
}

impl OwnerLevels {
    /// Drop a subgroup that merely repeats the group.
    pub fn tidy(mut self) -> Self {
        if self.subgroup.is_some() && self.subgroup == self.group {
            self.subgroup = None;
        }
        self
    }
}

/// Strategy for turning a raw path into [`OwnerLevels`].
pub trait HierarchyPolicy {
    fn parse(&self, path: &str) -> OwnerLevels;
}

/// Split on the given separators, trimming and dropping empty segments.
pub fn split_path<'a>(path: &'a str, separators: &[&str]) -> Vec<&'a str> {
    let mut segments = vec![path];
    for sep in separators {
        segments = segments.into_iter().flat_map(|s| s.split(*sep)).collect();
    }
    segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Rewrite the legacy person-name group into the production unit.
pub fn correct_legacy(levels: OwnerLevels) -> OwnerLevels {
    if levels.group.as_deref() == Some(LEGACY_GROUP_NAME) {
        OwnerLevels {
            group: Some(PRODUCTION_GROUP.to_string()),
            subgroup: None,
            member: Some(LEGACY_GROUP_NAME.to_string()),
        }
    } else {
        levels
    }
}

/// Levels by position: group, then member or subgroup + member.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalPolicy;

impl HierarchyPolicy for PositionalPolicy {
    fn parse(&self, path: &str) -> OwnerLevels {
        let parts = split_path(path, &["/"]);
        let levels = match parts.as_slice() {
            [] => OwnerLevels::default(),
            [group] => OwnerLevels {
                group: Some(group.to_string()),
                ..Default::default()
            },
            [group, member] => OwnerLevels {
                group: Some(group.to_string()),
                subgroup: None,
                member: Some(member.to_string()),
            },
            [group, subgroup, rest @ ..] => OwnerLevels {
                group: Some(group.to_string()),
                subgroup: Some(subgroup.to_string()),
                member: Some(rest.join(" / ")),
            },
        };
        correct_legacy(levels).tidy()
    }
}

/// Anchors the group on the first segment found in a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct VocabularyPolicy {
    vocabulary: Vec<String>,
}

impl Default for VocabularyPolicy {
    fn default() -> Self {
        Self::new(GROUP_VOCABULARY.iter().map(|s| s.to_string()).collect())
    }
}

impl VocabularyPolicy {
    pub fn new(vocabulary: Vec<String>) -> Self {
        Self { vocabulary }
    }
}

impl HierarchyPolicy for VocabularyPolicy {
    fn parse(&self, path: &str) -> OwnerLevels {
        let parts = split_path(path, &[">>", "/"]);
        if parts.is_empty() {
            return OwnerLevels::default();
        }
        if parts[0] == LEGACY_GROUP_NAME {
            return correct_legacy(OwnerLevels {
                group: Some(parts[0].to_string()),
                ..Default::default()
            });
        }

        let anchor = parts
            .iter()
            .position(|p| self.vocabulary.iter().any(|v| v == p));

        let levels = match anchor {
            Some(i) => {
                let rest = &parts[i + 1..];
                OwnerLevels {
                    group: Some(parts[i].to_string()),
                    subgroup: (!rest.is_empty()).then(|| rest.join(" / ")),
                    member: None,
                }
            }
            // A lone unrecognised segment names a person on the production floor.
            None if parts.len() == 1 => OwnerLevels {
                group: Some(PRODUCTION_GROUP.to_string()),
                subgroup: Some(parts[0].to_string()),
                member: None,
            },
            None => OwnerLevels {
                group: Some(FALLBACK_GROUP.to_string()),
                subgroup: Some(parts.join(" / ")),
                member: None,
            },
        };
        levels.tidy()
    }
}

/// Build the configured policy as a trait object.
pub fn policy_for(kind: HierarchyPolicyKind) -> Box<dyn HierarchyPolicy> {
    match kind {
        HierarchyPolicyKind::Positional => Box::new(PositionalPolicy),
        HierarchyPolicyKind::Vocabulary => Box::new(VocabularyPolicy::default()),
    }
}
