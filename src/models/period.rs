use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::timesheet::TimesheetStatus;

use super::DailyEntry;

/// A seven-day timesheet owned by one user (weekly log).
///
/// `total_hours` and `total_charges` are derived from the period's live
/// entries and are only ever written by the aggregation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TimesheetPeriod {
    pub id: i32,
    pub owner_id: i32,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    #[schema(value_type = String)]
    pub total_hours: Decimal,
    #[schema(value_type = String)]
    pub total_charges: Decimal,
    pub status: TimesheetStatus,
    pub manager_comment: Option<String>,
    pub is_deleted: bool,
    /// Optimistic concurrency token, bumped on every save.
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimesheetPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.date_from && date <= self.date_to
    }

    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.date_from <= to && self.date_to >= from
    }
}

/// Fields for a period that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewPeriod {
    pub owner_id: i32,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

/// A period together with its live entries.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PeriodWithEntries {
    #[serde(flatten)]
    pub period: TimesheetPeriod,
    pub entries: Vec<DailyEntry>,
}
