use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle status of a weekly period.
///
/// Stored as the Postgres enum `timesheet_status`, so a row can never carry a
/// value outside these four variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "timesheet_status")]
pub enum TimesheetStatus {
    Draft,
    Pending,
    Approved,
    Denied,
}

/// Actions that move a period between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Submit,
    Approve,
    Deny,
}

impl Transition {
    pub fn as_str(self) -> &'static str {
        match self {
            Transition::Submit => "submit",
            Transition::Approve => "approve",
            Transition::Deny => "deny",
        }
    }
}

impl TimesheetStatus {
    /// Transition table. `None` means the action is illegal from this status.
    pub fn apply(self, transition: Transition) -> Option<TimesheetStatus> {
        match (self, transition) {
            (TimesheetStatus::Draft, Transition::Submit) => Some(TimesheetStatus::Pending),
            (TimesheetStatus::Pending, Transition::Approve) => Some(TimesheetStatus::Approved),
            (TimesheetStatus::Pending, Transition::Deny) => Some(TimesheetStatus::Denied),
            _ => None,
        }
    }

    /// Entries and dates are only editable while the period is a draft.
    pub fn is_editable(self) -> bool {
        self == TimesheetStatus::Draft
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimesheetStatus::Draft => "Draft",
            TimesheetStatus::Pending => "Pending",
            TimesheetStatus::Approved => "Approved",
            TimesheetStatus::Denied => "Denied",
        }
    }
}

impl std::fmt::Display for TimesheetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TimesheetStatus; 4] = [
        TimesheetStatus::Draft,
        TimesheetStatus::Pending,
        TimesheetStatus::Approved,
        TimesheetStatus::Denied,
    ];

    #[test]
    fn test_submit_only_from_draft() {
        for status in ALL {
            let next = status.apply(Transition::Submit);
            if status == TimesheetStatus::Draft {
                assert_eq!(next, Some(TimesheetStatus::Pending));
            } else {
                assert_eq!(next, None, "submit from {status} should be illegal");
            }
        }
    }

    #[test]
    fn test_decisions_only_from_pending() {
        for status in ALL {
            let approved = status.apply(Transition::Approve);
            let denied = status.apply(Transition::Deny);
            if status == TimesheetStatus::Pending {
                assert_eq!(approved, Some(TimesheetStatus::Approved));
                assert_eq!(denied, Some(TimesheetStatus::Denied));
            } else {
                assert_eq!(approved, None);
                assert_eq!(denied, None);
            }
        }
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for status in [TimesheetStatus::Approved, TimesheetStatus::Denied] {
            assert!(!status.is_editable());
            for t in [Transition::Submit, Transition::Approve, Transition::Deny] {
                assert_eq!(status.apply(t), None);
            }
        }
    }

    #[test]
    fn test_unknown_status_is_rejected_on_deserialize() {
        let parsed: Result<TimesheetStatus, _> = serde_json::from_str("\"Archived\"");
        assert!(parsed.is_err());
        let parsed: TimesheetStatus = serde_json::from_str("\"Pending\"").unwrap();
        assert_eq!(parsed, TimesheetStatus::Pending);
    }
}
