use chrono::NaiveDate;

use crate::models::TimesheetPeriod;

/// Number of calendar days in a period, both ends inclusive.
pub const PERIOD_LENGTH_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeriodError {
    #[error("date_to {date_to} is before date_from {date_from}")]
    InvalidRange { date_from: NaiveDate, date_to: NaiveDate },

    #[error("a period must span exactly 7 days, got {days}")]
    InvalidDuration { days: i64 },

    #[error("overlaps existing period {existing_id} ({from} to {to})")]
    OverlappingPeriod {
        existing_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    },
}

/// Validate the date range of a period that is about to be created.
///
/// `existing` may contain periods of any owner and deleted rows; only the
/// live periods of `owner_id` take part in the overlap scan.
pub fn validate_new_period(
    owner_id: i32,
    date_from: NaiveDate,
    date_to: NaiveDate,
    existing: &[TimesheetPeriod],
) -> Result<(), PeriodError> {
    check_range(date_from, date_to)?;
    check_overlap(owner_id, None, date_from, date_to, existing)
}

/// Same checks as [`validate_new_period`], ignoring the period being edited.
pub fn validate_updated_period(
    period_id: i32,
    owner_id: i32,
    date_from: NaiveDate,
    date_to: NaiveDate,
    existing: &[TimesheetPeriod],
) -> Result<(), PeriodError> {
    check_range(date_from, date_to)?;
    check_overlap(owner_id, Some(period_id), date_from, date_to, existing)
}

fn check_range(date_from: NaiveDate, date_to: NaiveDate) -> Result<(), PeriodError> {
    if date_to < date_from {
        return Err(PeriodError::InvalidRange { date_from, date_to });
    }

    let days = (date_to - date_from).num_days() + 1;
    if days != PERIOD_LENGTH_DAYS {
        return Err(PeriodError::InvalidDuration { days });
    }

    Ok(())
}

fn check_overlap(
    owner_id: i32,
    exclude_id: Option<i32>,
    date_from: NaiveDate,
    date_to: NaiveDate,
    existing: &[TimesheetPeriod],
) -> Result<(), PeriodError> {
    let clash = existing
        .iter()
        .filter(|p| p.owner_id == owner_id && !p.is_deleted)
        .filter(|p| Some(p.id) != exclude_id)
        .find(|p| p.overlaps(date_from, date_to));

    match clash {
        Some(p) => Err(PeriodError::OverlappingPeriod {
            existing_id: p.id,
            from: p.date_from,
            to: p.date_to,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timesheet::test_support::{date, period};

    #[test]
    fn test_accepts_exact_week() {
        assert_eq!(validate_new_period(1, date(2024, 1, 1), date(2024, 1, 7), &[]), Ok(()));
    }

    #[test]
    fn test_rejects_reversed_range() {
        let err = validate_new_period(1, date(2024, 1, 7), date(2024, 1, 1), &[]).unwrap_err();
        assert!(matches!(err, PeriodError::InvalidRange { .. }));
    }

    #[test]
    fn test_rejects_wrong_length() {
        let err = validate_new_period(1, date(2024, 1, 1), date(2024, 1, 6), &[]).unwrap_err();
        assert_eq!(err, PeriodError::InvalidDuration { days: 6 });

        let err = validate_new_period(1, date(2024, 1, 1), date(2024, 1, 8), &[]).unwrap_err();
        assert_eq!(err, PeriodError::InvalidDuration { days: 8 });

        let err = validate_new_period(1, date(2024, 1, 1), date(2024, 1, 1), &[]).unwrap_err();
        assert_eq!(err, PeriodError::InvalidDuration { days: 1 });
    }

    #[test]
    fn test_rejects_overlap_with_own_period() {
        let existing = vec![period(10, 1, date(2024, 1, 1))];
        let err = validate_new_period(1, date(2024, 1, 5), date(2024, 1, 11), &existing).unwrap_err();
        assert_eq!(
            err,
            PeriodError::OverlappingPeriod {
                existing_id: 10,
                from: date(2024, 1, 1),
                to: date(2024, 1, 7),
            }
        );
    }

    #[test]
    fn test_touching_weeks_do_not_overlap() {
        let existing = vec![period(10, 1, date(2024, 1, 1))];
        assert_eq!(validate_new_period(1, date(2024, 1, 8), date(2024, 1, 14), &existing), Ok(()));
        // Shared boundary day counts as overlap
        assert!(validate_new_period(1, date(2023, 12, 26), date(2024, 1, 1), &existing).is_err());
    }

    #[test]
    fn test_ignores_other_owners_and_deleted_periods() {
        let mut deleted = period(11, 1, date(2024, 1, 1));
        deleted.is_deleted = true;
        let existing = vec![period(10, 2, date(2024, 1, 1)), deleted];
        assert_eq!(validate_new_period(1, date(2024, 1, 1), date(2024, 1, 7), &existing), Ok(()));
    }

    #[test]
    fn test_update_excludes_itself() {
        let existing = vec![period(10, 1, date(2024, 1, 1)), period(11, 1, date(2024, 1, 15))];
        assert_eq!(
            validate_updated_period(10, 1, date(2024, 1, 2), date(2024, 1, 8), &existing),
            Ok(())
        );
        let err = validate_updated_period(10, 1, date(2024, 1, 10), date(2024, 1, 16), &existing).unwrap_err();
        assert!(matches!(err, PeriodError::OverlappingPeriod { existing_id: 11, .. }));
    }
}
