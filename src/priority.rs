//! Priority inference.

use crate::fields::Priority;

/// Workflow status to priority tier.
const STATUS_PRIORITY: &[(&str, Priority)] = &[
    ("Não iniciada", Priority::Low),
    ("Backlog", Priority::Medium),
    ("Em Produção", Priority::High),
];

/// Tier used when neither an explicit value nor the status decides.
pub const DEFAULT_PRIORITY: Priority = Priority::Medium;

/// Look up the tier mapped to a workflow status.
pub fn priority_for_status(status: &str) -> Option<Priority> {
    let status = status.trim();
    STATUS_PRIORITY
        .iter()
        .find(|(s, _)| *s == status)
        .map(|(_, p)| *p)
}

/// Resolve a task's tier: explicit value, then status table, then the default.
pub fn resolve_priority(explicit: Option<&str>, status: Option<&str>) -> Priority {
    explicit
        .and_then(Priority::parse)
        .or_else(|| status.and_then(priority_for_status))
        .unwrap_or(DEFAULT_PRIORITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_valid_priority_wins() {
        assert_eq!(resolve_priority(Some("low"), Some("Em Produção")), Priority::Low);
    }

    #[test]
    fn invalid_explicit_falls_through_to_status() {
        assert_eq!(resolve_priority(Some("urgent"), Some("Em Produção")), Priority::High);
        assert_eq!(resolve_priority(None, Some("Não iniciada")), Priority::Low);
    }

    #[test]
    fn unknown_status_is_medium() {
        assert_eq!(resolve_priority(None, Some("Aprovada")), Priority::Medium);
        assert_eq!(resolve_priority(None, None), Priority::Medium);
    }
}
