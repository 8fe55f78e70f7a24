use std::sync::Arc;

use chrono::Utc;
use metrics::counter;

use crate::{
    models::{
        CreateEntryInput, CreatePeriodInput, DailyEntry, NewEntry, NewPeriod, PeriodFilter, PeriodWithEntries,
        TimesheetPeriod, UpdateEntryInput, UpdatePeriodInput,
    },
    store::{ManagerDirectory, TimesheetStore},
    AppError, AppResult,
};

use super::{
    aggregation::{self, RecalcOutcome},
    approval, entry_validator, period_validator, TimesheetStatus, Transition,
};

/// Result of a create/update/delete on a daily entry.
///
/// The entry write has already committed when this is returned. `period`
/// holds the recalculated totals, or `None` together with a `warning` if the
/// recalculation could not be completed.
#[derive(Debug, Clone)]
pub struct EntryMutation {
    pub entry: DailyEntry,
    pub period: Option<TimesheetPeriod>,
    pub warning: Option<String>,
}

/// Orchestrates validation, persistence and recalculation for periods and
/// their daily entries.
#[derive(Clone)]
pub struct TimesheetService {
    store: Arc<dyn TimesheetStore>,
    directory: Arc<dyn ManagerDirectory>,
}

impl TimesheetService {
    pub fn new(store: Arc<dyn TimesheetStore>, directory: Arc<dyn ManagerDirectory>) -> Self {
        Self { store, directory }
    }

    // Periods

    pub async fn create_period(&self, owner_id: i32, input: CreatePeriodInput) -> AppResult<TimesheetPeriod> {
        let existing = self.store.list_periods(owner_id, &PeriodFilter::default()).await?;
        period_validator::validate_new_period(owner_id, input.date_from, input.date_to, &existing)?;

        let period = self
            .store
            .insert_period(NewPeriod {
                owner_id,
                date_from: input.date_from,
                date_to: input.date_to,
            })
            .await?;

        tracing::info!(
            period_id = period.id,
            owner_id,
            date_from = %period.date_from,
            "Timesheet period created"
        );
        Ok(period)
    }

    /// Moves a draft to another week. Existing entries must still fit.
    pub async fn update_period(
        &self,
        owner_id: i32,
        period_id: i32,
        input: UpdatePeriodInput,
    ) -> AppResult<TimesheetPeriod> {
        let mut period = self.owned_period(owner_id, period_id).await?;
        if !period.status.is_editable() {
            return Err(AppError::Locked(period.status));
        }

        let existing = self.store.list_periods(owner_id, &PeriodFilter::default()).await?;
        period_validator::validate_updated_period(period_id, owner_id, input.date_from, input.date_to, &existing)?;

        period.date_from = input.date_from;
        period.date_to = input.date_to;

        let entries = self.store.get_entries(period_id).await?;
        if let Some(stray) = entries.iter().find(|e| !period.contains(e.date)) {
            return Err(AppError::Validation(format!(
                "entry for {} would fall outside the new range",
                stray.date
            )));
        }

        period.updated_at = Utc::now();

        let saved = self.save_or_conflict(&period).await?;
        tracing::info!(period_id, owner_id, date_from = %saved.date_from, "Timesheet period moved");
        Ok(saved)
    }

    /// Soft-deletes the period and all of its entries. Allowed for drafts and
    /// denied periods; submitted and approved weeks stay on record.
    pub async fn delete_period(&self, owner_id: i32, period_id: i32) -> AppResult<()> {
        let period = self.owned_period(owner_id, period_id).await?;
        if !matches!(period.status, TimesheetStatus::Draft | TimesheetStatus::Denied) {
            return Err(AppError::Locked(period.status));
        }

        if !self.store.soft_delete_period(&period).await? {
            return Err(AppError::Conflict(format!(
                "Period {} was modified concurrently",
                period_id
            )));
        }

        tracing::info!(period_id, owner_id, "Timesheet period deleted with its entries");
        Ok(())
    }

    /// Visible to the owner and to the owner's manager.
    pub async fn get_period(&self, actor_id: i32, period_id: i32) -> AppResult<PeriodWithEntries> {
        let period = self.visible_period(actor_id, period_id).await?;
        let entries = self.store.get_entries(period_id).await?;
        Ok(PeriodWithEntries { period, entries })
    }

    pub async fn list_periods(&self, owner_id: i32, filter: &PeriodFilter) -> AppResult<Vec<TimesheetPeriod>> {
        self.store.list_periods(owner_id, filter).await
    }

    /// Periods of everyone reporting to `manager_id`.
    pub async fn list_team_periods(
        &self,
        manager_id: i32,
        filter: &PeriodFilter,
    ) -> AppResult<Vec<TimesheetPeriod>> {
        let team = self.directory.team_member_ids(manager_id).await?;
        if team.is_empty() {
            return Ok(Vec::new());
        }
        self.store.list_periods_for_owners(&team, filter).await
    }

    // Entries

    pub async fn list_entries(&self, actor_id: i32, period_id: i32) -> AppResult<Vec<DailyEntry>> {
        self.visible_period(actor_id, period_id).await?;
        self.store.get_entries(period_id).await
    }

    pub async fn create_entry(
        &self,
        owner_id: i32,
        period_id: i32,
        input: CreateEntryInput,
    ) -> AppResult<EntryMutation> {
        let fields = input.fields();
        entry_validator::validate_fields(&fields).map_err(AppError::Fields)?;

        let period = self.owned_period(owner_id, period_id).await?;
        if !period.status.is_editable() {
            return Err(AppError::Locked(period.status));
        }

        let existing = self.store.get_entries(period_id).await?;
        entry_validator::validate_entry(period.date_from, period.date_to, input.date, None, &existing)?;

        let entry = self
            .store
            .insert_entry(NewEntry {
                period_id,
                owner_id,
                date: input.date,
                fields,
            })
            .await?;
        let Some(entry) = entry else {
            return Err(self.rejected_entry_write(period_id, "Period").await);
        };

        tracing::info!(entry_id = entry.id, period_id, date = %entry.date, "Daily entry created");
        Ok(self.after_entry_mutation(entry).await)
    }

    pub async fn update_entry(
        &self,
        owner_id: i32,
        entry_id: i32,
        input: UpdateEntryInput,
    ) -> AppResult<EntryMutation> {
        let (mut entry, period) = self.editable_entry(owner_id, entry_id).await?;

        let fields = input.merge_into(entry.fields());
        entry_validator::validate_fields(&fields).map_err(AppError::Fields)?;

        let date = input.date.unwrap_or(entry.date);
        let existing = self.store.get_entries(period.id).await?;
        entry_validator::validate_entry(period.date_from, period.date_to, date, Some(entry_id), &existing)?;

        entry.date = date;
        entry.apply_fields(fields);
        entry.updated_at = Utc::now();
        let Some(entry) = self.store.save_entry(&entry).await? else {
            return Err(self.rejected_entry_write(period.id, "Entry").await);
        };

        tracing::info!(entry_id, period_id = period.id, "Daily entry updated");
        Ok(self.after_entry_mutation(entry).await)
    }

    pub async fn delete_entry(&self, owner_id: i32, entry_id: i32) -> AppResult<EntryMutation> {
        let (mut entry, period) = self.editable_entry(owner_id, entry_id).await?;

        entry.is_deleted = true;
        entry.updated_at = Utc::now();
        let Some(entry) = self.store.save_entry(&entry).await? else {
            return Err(self.rejected_entry_write(period.id, "Entry").await);
        };

        tracing::info!(entry_id, period_id = period.id, "Daily entry deleted");
        Ok(self.after_entry_mutation(entry).await)
    }

    // Approval

    pub async fn submit(&self, owner_id: i32, period_id: i32) -> AppResult<TimesheetPeriod> {
        let mut period = self.live_period(period_id).await?;
        approval::submit(&mut period, owner_id)?;
        self.commit_transition(period, owner_id, Transition::Submit).await
    }

    pub async fn approve(
        &self,
        manager_id: i32,
        period_id: i32,
        comment: Option<String>,
    ) -> AppResult<TimesheetPeriod> {
        let mut period = self.live_period(period_id).await?;
        let manages_owner = self.directory.is_manager_of(manager_id, period.owner_id).await?;
        approval::approve(&mut period, manages_owner, comment)?;
        self.commit_transition(period, manager_id, Transition::Approve).await
    }

    pub async fn deny(
        &self,
        manager_id: i32,
        period_id: i32,
        reason: Option<String>,
    ) -> AppResult<TimesheetPeriod> {
        // Reject a missing reason before touching the store
        let reason = approval::validate_deny_reason(reason)?;

        let mut period = self.live_period(period_id).await?;
        let manages_owner = self.directory.is_manager_of(manager_id, period.owner_id).await?;
        approval::deny(&mut period, manages_owner, Some(reason))?;
        self.commit_transition(period, manager_id, Transition::Deny).await
    }

    // Helpers

    async fn commit_transition(
        &self,
        period: TimesheetPeriod,
        actor_id: i32,
        transition: Transition,
    ) -> AppResult<TimesheetPeriod> {
        let saved = self.save_or_conflict(&period).await?;

        counter!(
            "timesheet_transitions_total",
            "transition" => transition.as_str(),
            "status" => saved.status.as_str()
        )
        .increment(1);

        tracing::info!(
            period_id = saved.id,
            actor_id,
            transition = transition.as_str(),
            status = %saved.status,
            "Timesheet period transitioned"
        );
        Ok(saved)
    }

    /// Post-commit step after every entry write: recalculate the parent
    /// period's totals and report, without failing, if that is impossible.
    async fn after_entry_mutation(&self, entry: DailyEntry) -> EntryMutation {
        let period_id = entry.period_id;

        let failure = match aggregation::recalculate(self.store.as_ref(), period_id).await {
            Ok(RecalcOutcome::Updated(period)) => {
                return EntryMutation {
                    entry,
                    period: Some(period),
                    warning: None,
                };
            }
            Ok(RecalcOutcome::PeriodMissing { .. }) => "period not found".to_string(),
            Err(e) => e.to_string(),
        };

        counter!("timesheet_aggregation_inconsistencies_total").increment(1);
        tracing::error!(
            period_id,
            entry_id = entry.id,
            reason = %failure,
            "Aggregation inconsistency: period totals were not recalculated"
        );

        EntryMutation {
            entry,
            period: None,
            warning: Some(format!("period totals could not be recalculated: {}", failure)),
        }
    }

    async fn save_or_conflict(&self, period: &TimesheetPeriod) -> AppResult<TimesheetPeriod> {
        self.store.save_period(period).await?.ok_or_else(|| {
            tracing::warn!(period_id = period.id, version = period.version, "Stale period write rejected");
            AppError::Conflict(format!("Period {} was modified concurrently", period.id))
        })
    }

    /// The store refused an entry write because the period left `Draft` or
    /// the period or entry disappeared after it was read.
    async fn rejected_entry_write(&self, period_id: i32, what: &'static str) -> AppError {
        match self.store.get_period(period_id).await {
            Ok(Some(period)) if !period.status.is_editable() => {
                tracing::warn!(period_id, status = %period.status, "Entry write lost a race with a transition");
                AppError::Locked(period.status)
            }
            Ok(_) => AppError::NotFoundOrForbidden(what),
            Err(e) => e,
        }
    }

    async fn live_period(&self, period_id: i32) -> AppResult<TimesheetPeriod> {
        self.store
            .get_period(period_id)
            .await?
            .ok_or(AppError::NotFoundOrForbidden("Period"))
    }

    async fn owned_period(&self, owner_id: i32, period_id: i32) -> AppResult<TimesheetPeriod> {
        let period = self.live_period(period_id).await?;
        if period.owner_id != owner_id {
            return Err(AppError::NotFoundOrForbidden("Period"));
        }
        Ok(period)
    }

    async fn visible_period(&self, actor_id: i32, period_id: i32) -> AppResult<TimesheetPeriod> {
        let period = self.live_period(period_id).await?;
        if period.owner_id == actor_id || self.directory.is_manager_of(actor_id, period.owner_id).await? {
            return Ok(period);
        }
        Err(AppError::NotFoundOrForbidden("Period"))
    }

    /// Loads an entry owned by `owner_id` together with its parent period,
    /// which must still be a draft.
    async fn editable_entry(&self, owner_id: i32, entry_id: i32) -> AppResult<(DailyEntry, TimesheetPeriod)> {
        let entry = self
            .store
            .get_entry(entry_id)
            .await?
            .filter(|e| e.owner_id == owner_id)
            .ok_or(AppError::NotFoundOrForbidden("Entry"))?;

        let period = self
            .owned_period(owner_id, entry.period_id)
            .await
            .map_err(|_| AppError::NotFoundOrForbidden("Entry"))?;
        if !period.status.is_editable() {
            return Err(AppError::Locked(period.status));
        }

        Ok((entry, period))
    }
}
