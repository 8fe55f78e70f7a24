use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::{
    models::{DailyEntry, NewEntry, NewPeriod, PeriodFilter, TimesheetPeriod},
    timesheet::{validate_new_period, validate_updated_period, EntryError, TimesheetStatus},
    AppResult,
};

use super::{ManagerDirectory, TimesheetStore};

#[derive(Default)]
struct Tables {
    periods: BTreeMap<i32, TimesheetPeriod>,
    entries: BTreeMap<i32, DailyEntry>,
    next_period_id: i32,
    next_entry_id: i32,
}

/// In-process store with the same version and uniqueness rules as Postgres.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Drops a period row outright, leaving its entries orphaned.
    pub async fn purge_period(&self, id: i32) {
        self.tables.lock().await.periods.remove(&id);
    }

    pub async fn raw_entries(&self, period_id: i32) -> Vec<DailyEntry> {
        let tables = self.tables.lock().await;
        tables
            .entries
            .values()
            .filter(|e| e.period_id == period_id)
            .cloned()
            .collect()
    }
}

fn draft_period(tables: &Tables, period_id: i32) -> bool {
    tables
        .periods
        .get(&period_id)
        .is_some_and(|p| !p.is_deleted && p.status.is_editable())
}

fn duplicate_live_entry(tables: &Tables, entry_id: Option<i32>, period_id: i32, date: chrono::NaiveDate) -> bool {
    tables
        .entries
        .values()
        .any(|e| !e.is_deleted && Some(e.id) != entry_id && e.period_id == period_id && e.date == date)
}

#[async_trait]
impl TimesheetStore for MemoryStore {
    async fn get_period(&self, id: i32) -> AppResult<Option<TimesheetPeriod>> {
        let tables = self.tables.lock().await;
        Ok(tables.periods.get(&id).filter(|p| !p.is_deleted).cloned())
    }

    async fn list_periods(&self, owner_id: i32, filter: &PeriodFilter) -> AppResult<Vec<TimesheetPeriod>> {
        let tables = self.tables.lock().await;
        let mut periods: Vec<_> = tables
            .periods
            .values()
            .filter(|p| !p.is_deleted && p.owner_id == owner_id && filter.matches(p))
            .cloned()
            .collect();
        periods.sort_by(|a, b| b.date_from.cmp(&a.date_from));
        Ok(periods)
    }

    async fn list_periods_for_owners(
        &self,
        owner_ids: &[i32],
        filter: &PeriodFilter,
    ) -> AppResult<Vec<TimesheetPeriod>> {
        let tables = self.tables.lock().await;
        let mut periods: Vec<_> = tables
            .periods
            .values()
            .filter(|p| !p.is_deleted && owner_ids.contains(&p.owner_id) && filter.matches(p))
            .cloned()
            .collect();
        periods.sort_by(|a, b| a.date_from.cmp(&b.date_from).then(a.owner_id.cmp(&b.owner_id)));
        Ok(periods)
    }

    async fn insert_period(&self, period: NewPeriod) -> AppResult<TimesheetPeriod> {
        let mut tables = self.tables.lock().await;
        // Mirrors the exclusion constraint on live weeks
        let existing: Vec<_> = tables.periods.values().cloned().collect();
        validate_new_period(period.owner_id, period.date_from, period.date_to, &existing)?;

        tables.next_period_id += 1;
        let now = Utc::now();
        let row = TimesheetPeriod {
            id: tables.next_period_id,
            owner_id: period.owner_id,
            date_from: period.date_from,
            date_to: period.date_to,
            total_hours: Decimal::ZERO,
            total_charges: Decimal::ZERO,
            status: TimesheetStatus::Draft,
            manager_comment: None,
            is_deleted: false,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        tables.periods.insert(row.id, row.clone());
        Ok(row)
    }

    async fn save_period(&self, period: &TimesheetPeriod) -> AppResult<Option<TimesheetPeriod>> {
        let mut tables = self.tables.lock().await;
        let current = tables.periods.get(&period.id);
        if current.is_none_or(|p| p.is_deleted || p.version != period.version) {
            return Ok(None);
        }
        let existing: Vec<_> = tables.periods.values().cloned().collect();
        validate_updated_period(period.id, period.owner_id, period.date_from, period.date_to, &existing)?;
        let Some(stored) = tables.periods.get_mut(&period.id) else {
            return Ok(None);
        };

        let mut saved = period.clone();
        saved.version += 1;
        *stored = saved.clone();
        Ok(Some(saved))
    }

    async fn soft_delete_period(&self, period: &TimesheetPeriod) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        match tables.periods.get_mut(&period.id) {
            Some(stored) if !stored.is_deleted && stored.version == period.version => {
                stored.is_deleted = true;
                stored.version += 1;
                stored.updated_at = now;
            }
            _ => return Ok(false),
        }

        for entry in tables.entries.values_mut().filter(|e| e.period_id == period.id && !e.is_deleted) {
            entry.is_deleted = true;
            entry.updated_at = now;
        }
        Ok(true)
    }

    async fn get_entries(&self, period_id: i32) -> AppResult<Vec<DailyEntry>> {
        let tables = self.tables.lock().await;
        let mut entries: Vec<_> = tables
            .entries
            .values()
            .filter(|e| e.period_id == period_id && !e.is_deleted)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }

    async fn get_entry(&self, id: i32) -> AppResult<Option<DailyEntry>> {
        let tables = self.tables.lock().await;
        Ok(tables.entries.get(&id).filter(|e| !e.is_deleted).cloned())
    }

    async fn insert_entry(&self, entry: NewEntry) -> AppResult<Option<DailyEntry>> {
        let mut tables = self.tables.lock().await;
        if !draft_period(&tables, entry.period_id) {
            return Ok(None);
        }
        if duplicate_live_entry(&tables, None, entry.period_id, entry.date) {
            return Err(EntryError::DuplicateDate { date: entry.date }.into());
        }

        tables.next_entry_id += 1;
        let now = Utc::now();
        let fields = entry.fields;
        let row = DailyEntry {
            id: tables.next_entry_id,
            period_id: entry.period_id,
            owner_id: entry.owner_id,
            date: entry.date,
            hours: fields.hours,
            mileage: fields.mileage,
            toll_charge: fields.toll_charge,
            parking_fee: fields.parking_fee,
            other_charges: fields.other_charges,
            comment: fields.comment,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        tables.entries.insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn save_entry(&self, entry: &DailyEntry) -> AppResult<Option<DailyEntry>> {
        let mut tables = self.tables.lock().await;
        let live = tables.entries.get(&entry.id).is_some_and(|e| !e.is_deleted);
        if !live || !draft_period(&tables, entry.period_id) {
            return Ok(None);
        }
        if !entry.is_deleted && duplicate_live_entry(&tables, Some(entry.id), entry.period_id, entry.date) {
            return Err(EntryError::DuplicateDate { date: entry.date }.into());
        }
        tables.entries.insert(entry.id, entry.clone());
        Ok(Some(entry.clone()))
    }
}

/// Manager graph keyed by owner id.
#[derive(Default)]
pub struct MemoryDirectory {
    managers: HashMap<i32, i32>,
}

impl MemoryDirectory {
    pub fn with_reports(manager_id: i32, owner_ids: &[i32]) -> Self {
        let mut directory = Self::default();
        directory.assign(manager_id, owner_ids);
        directory
    }

    pub fn assign(&mut self, manager_id: i32, owner_ids: &[i32]) {
        for owner_id in owner_ids {
            self.managers.insert(*owner_id, manager_id);
        }
    }
}

#[async_trait]
impl ManagerDirectory for MemoryDirectory {
    async fn is_manager_of(&self, manager_id: i32, owner_id: i32) -> AppResult<bool> {
        Ok(self.managers.get(&owner_id) == Some(&manager_id))
    }

    async fn team_member_ids(&self, manager_id: i32) -> AppResult<Vec<i32>> {
        let mut ids: Vec<i32> = self
            .managers
            .iter()
            .filter(|(_, m)| **m == manager_id)
            .map(|(owner, _)| *owner)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
