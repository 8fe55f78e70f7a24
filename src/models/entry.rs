use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::TimesheetPeriod;

/// One day's hours and expenses inside a weekly period (daily log).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DailyEntry {
    pub id: i32,
    pub period_id: i32,
    pub owner_id: i32,
    pub date: NaiveDate,
    #[schema(value_type = String)]
    pub hours: Decimal,
    #[schema(value_type = String)]
    pub mileage: Decimal,
    #[schema(value_type = String)]
    pub toll_charge: Decimal,
    #[schema(value_type = String)]
    pub parking_fee: Decimal,
    #[schema(value_type = String)]
    pub other_charges: Decimal,
    pub comment: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DailyEntry {
    pub fn charges(&self) -> Decimal {
        self.toll_charge + self.parking_fee + self.other_charges
    }

    pub fn fields(&self) -> EntryFields {
        EntryFields {
            hours: self.hours,
            mileage: self.mileage,
            toll_charge: self.toll_charge,
            parking_fee: self.parking_fee,
            other_charges: self.other_charges,
            comment: self.comment.clone(),
        }
    }

    pub fn apply_fields(&mut self, fields: EntryFields) {
        self.hours = fields.hours;
        self.mileage = fields.mileage;
        self.toll_charge = fields.toll_charge;
        self.parking_fee = fields.parking_fee;
        self.other_charges = fields.other_charges;
        self.comment = fields.comment;
    }
}

/// The user-editable numeric and text fields of an entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntryFields {
    pub hours: Decimal,
    pub mileage: Decimal,
    pub toll_charge: Decimal,
    pub parking_fee: Decimal,
    pub other_charges: Decimal,
    pub comment: Option<String>,
}

/// Fields for an entry that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub period_id: i32,
    pub owner_id: i32,
    pub date: NaiveDate,
    pub fields: EntryFields,
}

/// Entry write result with the parent period's recalculated totals.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntryMutationData {
    pub entry: DailyEntry,
    /// `None` when the totals could not be recalculated
    pub period: Option<TimesheetPeriod>,
}
