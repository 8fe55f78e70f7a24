//! Persistence seams for the timesheet engine.
//!
//! Every read returns live (non-deleted) rows only. Writes to a period go
//! through [`TimesheetStore::save_period`], which is version-checked so two
//! concurrent writers cannot silently overwrite each other's totals.

pub mod directory;
#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    models::{DailyEntry, NewEntry, NewPeriod, PeriodFilter, TimesheetPeriod},
    AppResult,
};

pub use directory::PgManagerDirectory;
pub use postgres::PgTimesheetStore;

#[async_trait]
pub trait TimesheetStore: Send + Sync {
    async fn get_period(&self, id: i32) -> AppResult<Option<TimesheetPeriod>>;

    /// Periods of one owner, newest week first.
    async fn list_periods(&self, owner_id: i32, filter: &PeriodFilter) -> AppResult<Vec<TimesheetPeriod>>;

    /// Periods of several owners (a manager's team), oldest week first.
    async fn list_periods_for_owners(
        &self,
        owner_ids: &[i32],
        filter: &PeriodFilter,
    ) -> AppResult<Vec<TimesheetPeriod>>;

    /// Stores a new Draft period with zero totals.
    async fn insert_period(&self, period: NewPeriod) -> AppResult<TimesheetPeriod>;

    /// Writes `period` if the stored version still equals `period.version`.
    /// Returns the saved row (with a bumped version), or `None` when the row
    /// is gone or was changed by someone else in the meantime.
    async fn save_period(&self, period: &TimesheetPeriod) -> AppResult<Option<TimesheetPeriod>>;

    /// Marks the period and then all of its entries as deleted, atomically.
    /// Same version rule as [`TimesheetStore::save_period`].
    async fn soft_delete_period(&self, period: &TimesheetPeriod) -> AppResult<bool>;

    /// Live entries of a period ordered by date.
    async fn get_entries(&self, period_id: i32) -> AppResult<Vec<DailyEntry>>;

    async fn get_entry(&self, id: i32) -> AppResult<Option<DailyEntry>>;

    /// Stores the entry only while its period is live and still `Draft`,
    /// checked under the same lock that submit and delete take on the
    /// period. `None` means the period was not writable.
    async fn insert_entry(&self, entry: NewEntry) -> AppResult<Option<DailyEntry>>;

    /// Persists every mutable column of the entry, including `is_deleted`.
    /// Same period rule as [`TimesheetStore::insert_entry`]; the stored entry
    /// must also still be live. `None` means nothing was written.
    async fn save_entry(&self, entry: &DailyEntry) -> AppResult<Option<DailyEntry>>;
}

/// Read-only view of the manager graph owned by user administration.
#[async_trait]
pub trait ManagerDirectory: Send + Sync {
    /// Live lookup; never served from a cache.
    async fn is_manager_of(&self, manager_id: i32, owner_id: i32) -> AppResult<bool>;

    async fn team_member_ids(&self, manager_id: i32) -> AppResult<Vec<i32>>;
}
