use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::timesheet::TimesheetStatus;

/// Input for creating a weekly period
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePeriodInput {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

/// Input for moving a draft period to a different week
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdatePeriodInput {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

/// Query filter for period listings
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
pub struct PeriodFilter {
    pub status: Option<TimesheetStatus>,
    /// Only periods ending on or after this date
    pub from: Option<NaiveDate>,
    /// Only periods starting on or before this date
    pub to: Option<NaiveDate>,
}

impl PeriodFilter {
    pub fn pending() -> Self {
        Self {
            status: Some(TimesheetStatus::Pending),
            ..Self::default()
        }
    }

    pub fn matches(&self, period: &super::TimesheetPeriod) -> bool {
        self.status.is_none_or(|s| period.status == s)
            && self.from.is_none_or(|d| period.date_to >= d)
            && self.to.is_none_or(|d| period.date_from <= d)
    }
}

/// Input for a manager approving a pending period
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ApprovePeriodInput {
    pub comment: Option<String>,
}

/// Input for a manager denying a pending period
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DenyPeriodInput {
    pub reason: Option<String>,
}
