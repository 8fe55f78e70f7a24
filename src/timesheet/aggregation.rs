use chrono::Utc;
use rust_decimal::Decimal;

use crate::{
    models::{DailyEntry, TimesheetPeriod},
    store::TimesheetStore,
    AppError, AppResult,
};

/// Attempts before a recalculation gives up on a contended period.
const MAX_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub total_hours: Decimal,
    pub total_charges: Decimal,
}

/// Sums hours and charges over the live entries.
pub fn compute_totals(entries: &[DailyEntry]) -> Totals {
    entries
        .iter()
        .filter(|e| !e.is_deleted)
        .fold(Totals::default(), |acc, e| Totals {
            total_hours: acc.total_hours + e.hours,
            total_charges: acc.total_charges + e.charges(),
        })
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecalcOutcome {
    Updated(TimesheetPeriod),
    /// The period vanished between the entry write and the recalculation.
    PeriodMissing { period_id: i32 },
}

/// Recompute and persist the totals of one period from its live entries.
///
/// A stale write (someone else saved the period first) is retried against
/// the fresh row, so concurrent entry edits never lose each other's hours.
pub async fn recalculate(store: &dyn TimesheetStore, period_id: i32) -> AppResult<RecalcOutcome> {
    for attempt in 1..=MAX_ATTEMPTS {
        let Some(mut period) = store.get_period(period_id).await? else {
            return Ok(RecalcOutcome::PeriodMissing { period_id });
        };

        let entries = store.get_entries(period_id).await?;
        let totals = compute_totals(&entries);

        period.total_hours = totals.total_hours;
        period.total_charges = totals.total_charges;
        period.updated_at = Utc::now();

        if let Some(saved) = store.save_period(&period).await? {
            tracing::debug!(
                period_id,
                total_hours = %saved.total_hours,
                total_charges = %saved.total_charges,
                "Period totals recalculated"
            );
            return Ok(RecalcOutcome::Updated(saved));
        }

        tracing::debug!(period_id, attempt, "Stale period version during recalculation, retrying");
    }

    Err(AppError::Conflict(format!(
        "Period {} kept changing during recalculation",
        period_id
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryFields, NewEntry, NewPeriod};
    use crate::store::memory::MemoryStore;
    use crate::timesheet::test_support::{date, entry};

    #[test]
    fn test_compute_totals_skips_deleted() {
        let mut a = entry(1, 1, date(2024, 1, 1), 8);
        a.toll_charge = Decimal::new(250, 2);
        a.parking_fee = Decimal::from(5);
        let mut b = entry(2, 1, date(2024, 1, 2), 7);
        b.other_charges = Decimal::new(1050, 2);
        let mut gone = entry(3, 1, date(2024, 1, 3), 6);
        gone.parking_fee = Decimal::from(100);
        gone.is_deleted = true;

        let totals = compute_totals(&[a, b, gone]);
        assert_eq!(totals.total_hours, Decimal::from(15));
        assert_eq!(totals.total_charges, Decimal::from(18));
    }

    #[test]
    fn test_compute_totals_empty_is_zero() {
        assert_eq!(compute_totals(&[]), Totals::default());
    }

    #[tokio::test]
    async fn test_recalculate_persists_totals() {
        let store = MemoryStore::default();
        let period = store
            .insert_period(NewPeriod {
                owner_id: 1,
                date_from: date(2024, 1, 1),
                date_to: date(2024, 1, 7),
            })
            .await
            .unwrap();
        store
            .insert_entry(NewEntry {
                period_id: period.id,
                owner_id: 1,
                date: date(2024, 1, 2),
                fields: EntryFields {
                    hours: Decimal::new(75, 1),
                    toll_charge: Decimal::from(3),
                    ..EntryFields::default()
                },
            })
            .await
            .unwrap();

        let outcome = recalculate(&store, period.id).await.unwrap();
        let RecalcOutcome::Updated(saved) = outcome else {
            panic!("expected updated period, got {outcome:?}");
        };
        assert_eq!(saved.total_hours, Decimal::new(75, 1));
        assert_eq!(saved.total_charges, Decimal::from(3));
        assert_eq!(saved.version, period.version + 1);

        let stored = store.get_period(period.id).await.unwrap().unwrap();
        assert_eq!(stored, saved);
    }

    #[tokio::test]
    async fn test_recalculate_missing_period() {
        let store = MemoryStore::default();
        let outcome = recalculate(&store, 42).await.unwrap();
        assert_eq!(outcome, RecalcOutcome::PeriodMissing { period_id: 42 });
    }
}
