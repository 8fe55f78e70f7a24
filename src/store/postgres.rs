use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};

use crate::{
    models::{DailyEntry, NewEntry, NewPeriod, PeriodFilter, TimesheetPeriod},
    timesheet::{validate_new_period, validate_updated_period, EntryError},
    AppError, AppResult,
};

use super::TimesheetStore;

const PERIOD_FILTER: &str = r#"
    is_deleted = false
    AND ($2::timesheet_status IS NULL OR status = $2)
    AND ($3::date IS NULL OR date_to >= $3)
    AND ($4::date IS NULL OR date_from <= $4)
"#;

/// Postgres-backed store over the `"WeeklyLogs"` and `"DailyLogs"` tables.
#[derive(Clone)]
pub struct PgTimesheetStore {
    db: PgPool,
}

impl PgTimesheetStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Turns an overlap rejected by the database into the same error the
    /// service-level check reports, naming the week that won the race.
    async fn overlap_error(
        &self,
        owner_id: i32,
        period_id: Option<i32>,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> AppError {
        tracing::warn!(owner_id, %date_from, "Exclusion constraint rejected overlapping period");

        let existing = match self.list_periods(owner_id, &PeriodFilter::default()).await {
            Ok(existing) => existing,
            Err(e) => return e,
        };
        let clash = match period_id {
            Some(id) => validate_updated_period(id, owner_id, date_from, date_to, &existing),
            None => validate_new_period(owner_id, date_from, date_to, &existing),
        };

        match clash {
            Err(e) => e.into(),
            // The clashing week was deleted again before we looked
            Ok(()) => AppError::Conflict(format!(
                "Period {} to {} collided with a concurrent write",
                date_from, date_to
            )),
        }
    }
}

/// Exclusion constraint keeping one owner's live weeks disjoint.
const OVERLAP_CONSTRAINT: &str = "weekly_logs_no_overlap";

fn is_overlap_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.constraint() == Some(OVERLAP_CONSTRAINT))
}

/// The partial unique index on live `(period_id, date)` rows backs up the
/// duplicate check done before the write.
fn map_entry_write(err: sqlx::Error, date: NaiveDate) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            tracing::warn!(%date, "Unique index rejected duplicate daily entry");
            EntryError::DuplicateDate { date }.into()
        }
        _ => err.into(),
    }
}

/// Takes the row lock on a live draft period. Submit, transitions and the
/// cascade delete all update that row, so they serialize with entry writes.
async fn lock_draft_period(tx: &mut Transaction<'_, Postgres>, period_id: i32) -> AppResult<bool> {
    let locked: Option<i32> = sqlx::query_scalar(
        r#"
        SELECT id FROM "WeeklyLogs"
        WHERE id = $1 AND is_deleted = false AND status = 'Draft'
        FOR UPDATE
        "#,
    )
    .bind(period_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(locked.is_some())
}

#[async_trait]
impl TimesheetStore for PgTimesheetStore {
    async fn get_period(&self, id: i32) -> AppResult<Option<TimesheetPeriod>> {
        let period = sqlx::query_as::<_, TimesheetPeriod>(
            r#"SELECT * FROM "WeeklyLogs" WHERE id = $1 AND is_deleted = false"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(period)
    }

    async fn list_periods(&self, owner_id: i32, filter: &PeriodFilter) -> AppResult<Vec<TimesheetPeriod>> {
        let sql = format!(
            r#"SELECT * FROM "WeeklyLogs" WHERE owner_id = $1 AND {} ORDER BY date_from DESC"#,
            PERIOD_FILTER
        );

        let periods = sqlx::query_as::<_, TimesheetPeriod>(&sql)
            .bind(owner_id)
            .bind(filter.status)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, owner_id, "Failed to list periods");
                e
            })?;

        Ok(periods)
    }

    async fn list_periods_for_owners(
        &self,
        owner_ids: &[i32],
        filter: &PeriodFilter,
    ) -> AppResult<Vec<TimesheetPeriod>> {
        let sql = format!(
            r#"SELECT * FROM "WeeklyLogs" WHERE owner_id = ANY($1) AND {} ORDER BY date_from ASC, owner_id ASC"#,
            PERIOD_FILTER
        );

        let periods = sqlx::query_as::<_, TimesheetPeriod>(&sql)
            .bind(owner_ids)
            .bind(filter.status)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, owners = owner_ids.len(), "Failed to list team periods");
                e
            })?;

        Ok(periods)
    }

    async fn insert_period(&self, period: NewPeriod) -> AppResult<TimesheetPeriod> {
        let inserted = sqlx::query_as::<_, TimesheetPeriod>(
            r#"
            INSERT INTO "WeeklyLogs" (owner_id, date_from, date_to)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(period.owner_id)
        .bind(period.date_from)
        .bind(period.date_to)
        .fetch_one(&self.db)
        .await;

        match inserted {
            Err(e) if is_overlap_violation(&e) => Err(self
                .overlap_error(period.owner_id, None, period.date_from, period.date_to)
                .await),
            other => Ok(other?),
        }
    }

    async fn save_period(&self, period: &TimesheetPeriod) -> AppResult<Option<TimesheetPeriod>> {
        let saved = sqlx::query_as::<_, TimesheetPeriod>(
            r#"
            UPDATE "WeeklyLogs"
            SET date_from = $3,
                date_to = $4,
                total_hours = $5,
                total_charges = $6,
                status = $7,
                manager_comment = $8,
                updated_at = $9,
                version = version + 1
            WHERE id = $1 AND version = $2 AND is_deleted = false
            RETURNING *
            "#,
        )
        .bind(period.id)
        .bind(period.version)
        .bind(period.date_from)
        .bind(period.date_to)
        .bind(period.total_hours)
        .bind(period.total_charges)
        .bind(period.status)
        .bind(&period.manager_comment)
        .bind(period.updated_at)
        .fetch_optional(&self.db)
        .await;

        match saved {
            Err(e) if is_overlap_violation(&e) => Err(self
                .overlap_error(period.owner_id, Some(period.id), period.date_from, period.date_to)
                .await),
            other => Ok(other?),
        }
    }

    async fn soft_delete_period(&self, period: &TimesheetPeriod) -> AppResult<bool> {
        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE "WeeklyLogs"
            SET is_deleted = true, updated_at = NOW(), version = version + 1
            WHERE id = $1 AND version = $2 AND is_deleted = false
            "#,
        )
        .bind(period.id)
        .bind(period.version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let entries = sqlx::query(
            r#"UPDATE "DailyLogs" SET is_deleted = true, updated_at = NOW() WHERE period_id = $1 AND is_deleted = false"#,
        )
        .bind(period.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await.map_err(|e| {
            tracing::error!(error = %e, period_id = period.id, "Transaction rollback in soft_delete_period");
            AppError::Internal(format!("Failed to commit deletion of period {}: {}", period.id, e))
        })?;

        tracing::debug!(
            period_id = period.id,
            entries = entries.rows_affected(),
            "Cascade soft delete committed"
        );
        Ok(true)
    }

    async fn get_entries(&self, period_id: i32) -> AppResult<Vec<DailyEntry>> {
        let entries = sqlx::query_as::<_, DailyEntry>(
            r#"SELECT * FROM "DailyLogs" WHERE period_id = $1 AND is_deleted = false ORDER BY date"#,
        )
        .bind(period_id)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    async fn get_entry(&self, id: i32) -> AppResult<Option<DailyEntry>> {
        let entry = sqlx::query_as::<_, DailyEntry>(
            r#"SELECT * FROM "DailyLogs" WHERE id = $1 AND is_deleted = false"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(entry)
    }

    async fn insert_entry(&self, entry: NewEntry) -> AppResult<Option<DailyEntry>> {
        let mut tx = self.db.begin().await?;

        if !lock_draft_period(&mut tx, entry.period_id).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        let fields = &entry.fields;
        let row = sqlx::query_as::<_, DailyEntry>(
            r#"
            INSERT INTO "DailyLogs" (
                period_id, owner_id, date, hours, mileage, toll_charge, parking_fee, other_charges, comment
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(entry.period_id)
        .bind(entry.owner_id)
        .bind(entry.date)
        .bind(fields.hours)
        .bind(fields.mileage)
        .bind(fields.toll_charge)
        .bind(fields.parking_fee)
        .bind(fields.other_charges)
        .bind(&fields.comment)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_entry_write(e, entry.date))?;

        tx.commit().await?;
        Ok(Some(row))
    }

    async fn save_entry(&self, entry: &DailyEntry) -> AppResult<Option<DailyEntry>> {
        let mut tx = self.db.begin().await?;

        if !lock_draft_period(&mut tx, entry.period_id).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        let row = sqlx::query_as::<_, DailyEntry>(
            r#"
            UPDATE "DailyLogs"
            SET date = $2,
                hours = $3,
                mileage = $4,
                toll_charge = $5,
                parking_fee = $6,
                other_charges = $7,
                comment = $8,
                is_deleted = $9,
                updated_at = $10
            WHERE id = $1 AND is_deleted = false
            RETURNING *
            "#,
        )
        .bind(entry.id)
        .bind(entry.date)
        .bind(entry.hours)
        .bind(entry.mileage)
        .bind(entry.toll_charge)
        .bind(entry.parking_fee)
        .bind(entry.other_charges)
        .bind(&entry.comment)
        .bind(entry.is_deleted)
        .bind(entry.updated_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_entry_write(e, entry.date))?;

        tx.commit().await?;
        Ok(row)
    }
}
