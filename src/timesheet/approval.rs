//! Status transitions of a weekly period and who may trigger them.
//!
//! The functions here decide and apply a transition to an in-memory period;
//! persisting the result (with its version check) is the caller's job.
//! Authorization is checked before the current status so a caller who may
//! not see the period learns nothing about it.

use chrono::Utc;

use crate::models::TimesheetPeriod;

use super::{TimesheetStatus, Transition};

pub const MAX_MANAGER_COMMENT_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApprovalError {
    #[error("Period not found")]
    NotFoundOrForbidden,

    #[error("Cannot {} a period that is {}", .transition.as_str(), .from)]
    InvalidTransition {
        from: TimesheetStatus,
        transition: Transition,
    },

    #[error("{0}")]
    Validation(String),
}

/// Owner hands a draft in for review.
pub fn submit(period: &mut TimesheetPeriod, actor_id: i32) -> Result<(), ApprovalError> {
    if period.is_deleted || period.owner_id != actor_id {
        return Err(ApprovalError::NotFoundOrForbidden);
    }

    transition(period, Transition::Submit)
}

/// Manager accepts a pending period. `manages_owner` must come from a live
/// manager-graph lookup for this period's owner.
pub fn approve(
    period: &mut TimesheetPeriod,
    manages_owner: bool,
    comment: Option<String>,
) -> Result<(), ApprovalError> {
    if let Some(comment) = &comment {
        check_comment_length("comment", comment)?;
    }
    if period.is_deleted || !manages_owner {
        return Err(ApprovalError::NotFoundOrForbidden);
    }

    transition(period, Transition::Approve)?;
    period.manager_comment = comment;
    Ok(())
}

/// Manager rejects a pending period. The reason is mandatory.
pub fn deny(
    period: &mut TimesheetPeriod,
    manages_owner: bool,
    reason: Option<String>,
) -> Result<(), ApprovalError> {
    let reason = validate_deny_reason(reason)?;
    if period.is_deleted || !manages_owner {
        return Err(ApprovalError::NotFoundOrForbidden);
    }

    transition(period, Transition::Deny)?;
    period.manager_comment = Some(reason);
    Ok(())
}

/// Input check for a denial, usable before the period is even loaded.
pub fn validate_deny_reason(reason: Option<String>) -> Result<String, ApprovalError> {
    let reason = reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ApprovalError::Validation("reason: a reason is required to deny a period".to_string()))?;
    check_comment_length("reason", &reason)?;
    Ok(reason)
}

fn check_comment_length(field: &str, text: &str) -> Result<(), ApprovalError> {
    if text.chars().count() > MAX_MANAGER_COMMENT_CHARS {
        return Err(ApprovalError::Validation(format!(
            "{}: must be at most {} characters",
            field, MAX_MANAGER_COMMENT_CHARS
        )));
    }
    Ok(())
}

fn transition(period: &mut TimesheetPeriod, transition: Transition) -> Result<(), ApprovalError> {
    let next = period
        .status
        .apply(transition)
        .ok_or(ApprovalError::InvalidTransition {
            from: period.status,
            transition,
        })?;

    period.status = next;
    period.updated_at = Utc::now();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timesheet::test_support::{date, period};

    fn draft() -> TimesheetPeriod {
        period(1, 10, date(2024, 1, 1))
    }

    fn pending() -> TimesheetPeriod {
        let mut p = draft();
        p.status = TimesheetStatus::Pending;
        p
    }

    #[test]
    fn test_owner_submits_draft() {
        let mut p = draft();
        submit(&mut p, 10).unwrap();
        assert_eq!(p.status, TimesheetStatus::Pending);
    }

    #[test]
    fn test_submit_by_stranger_looks_like_missing() {
        let mut p = draft();
        assert_eq!(submit(&mut p, 11), Err(ApprovalError::NotFoundOrForbidden));
        assert_eq!(p.status, TimesheetStatus::Draft);
    }

    #[test]
    fn test_submit_twice_fails() {
        let mut p = pending();
        assert_eq!(
            submit(&mut p, 10),
            Err(ApprovalError::InvalidTransition {
                from: TimesheetStatus::Pending,
                transition: Transition::Submit,
            })
        );
    }

    #[test]
    fn test_approve_requires_pending() {
        let mut p = draft();
        let err = approve(&mut p, true, None).unwrap_err();
        assert!(matches!(err, ApprovalError::InvalidTransition { from: TimesheetStatus::Draft, .. }));
    }

    #[test]
    fn test_approve_sets_comment() {
        let mut p = pending();
        approve(&mut p, true, Some("ok".to_string())).unwrap();
        assert_eq!(p.status, TimesheetStatus::Approved);
        assert_eq!(p.manager_comment.as_deref(), Some("ok"));

        // Approved is terminal
        let err = approve(&mut p, true, None).unwrap_err();
        assert!(matches!(err, ApprovalError::InvalidTransition { from: TimesheetStatus::Approved, .. }));
        assert_eq!(p.manager_comment.as_deref(), Some("ok"));
    }

    #[test]
    fn test_approve_without_comment() {
        let mut p = pending();
        approve(&mut p, true, None).unwrap();
        assert_eq!(p.status, TimesheetStatus::Approved);
        assert_eq!(p.manager_comment, None);
    }

    #[test]
    fn test_wrong_manager_is_not_found() {
        let mut p = pending();
        assert_eq!(approve(&mut p, false, None), Err(ApprovalError::NotFoundOrForbidden));
        assert_eq!(
            deny(&mut p, false, Some("no".to_string())),
            Err(ApprovalError::NotFoundOrForbidden)
        );
        assert_eq!(p.status, TimesheetStatus::Pending);
    }

    #[test]
    fn test_deleted_period_is_not_found() {
        let mut p = pending();
        p.is_deleted = true;
        assert_eq!(approve(&mut p, true, None), Err(ApprovalError::NotFoundOrForbidden));
    }

    #[test]
    fn test_deny_requires_reason() {
        let mut p = pending();
        assert!(matches!(deny(&mut p, true, None), Err(ApprovalError::Validation(_))));
        assert!(matches!(
            deny(&mut p, true, Some("   ".to_string())),
            Err(ApprovalError::Validation(_))
        ));
        assert!(matches!(
            deny(&mut p, true, Some("x".repeat(MAX_MANAGER_COMMENT_CHARS + 1))),
            Err(ApprovalError::Validation(_))
        ));
        assert_eq!(p.status, TimesheetStatus::Pending);
    }

    #[test]
    fn test_deny_records_reason() {
        let mut p = pending();
        deny(&mut p, true, Some("missing Friday".to_string())).unwrap();
        assert_eq!(p.status, TimesheetStatus::Denied);
        assert_eq!(p.manager_comment.as_deref(), Some("missing Friday"));

        let err = deny(&mut p, true, Some("again".to_string())).unwrap_err();
        assert!(matches!(err, ApprovalError::InvalidTransition { from: TimesheetStatus::Denied, .. }));
    }
}
