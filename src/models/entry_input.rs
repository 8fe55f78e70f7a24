use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EntryFields;

/// Input for adding a daily entry to a period
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEntryInput {
    pub date: NaiveDate,
    #[schema(value_type = String)]
    pub hours: Decimal,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub mileage: Decimal,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub toll_charge: Decimal,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub parking_fee: Decimal,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub other_charges: Decimal,
    pub comment: Option<String>,
}

impl CreateEntryInput {
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
}

/// Input for editing a daily entry; omitted fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateEntryInput {
    pub date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub hours: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub mileage: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub toll_charge: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub parking_fee: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub other_charges: Option<Decimal>,
    pub comment: Option<String>,
}

impl UpdateEntryInput {
    pub fn merge_into(&self, current: EntryFields) -> EntryFields {
        EntryFields {
            hours: self.hours.unwrap_or(current.hours),
            mileage: self.mileage.unwrap_or(current.mileage),
            toll_charge: self.toll_charge.unwrap_or(current.toll_charge),
            parking_fee: self.parking_fee.unwrap_or(current.parking_fee),
            other_charges: self.other_charges.unwrap_or(current.other_charges),
            comment: self.comment.clone().or(current.comment),
        }
    }
}
