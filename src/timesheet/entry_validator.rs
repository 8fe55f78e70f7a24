use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{DailyEntry, EntryFields};

pub const MAX_DAILY_HOURS: Decimal = Decimal::from_parts(24, 0, 0, false, 0);
/// Largest value a `NUMERIC(10, 2)` amount column holds: 99_999_999.99
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);
/// Amounts and hours are stored with two decimal places.
pub const MAX_SCALE: u32 = 2;
pub const MAX_COMMENT_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    #[error("date {date} is outside the period {from} to {to}")]
    OutOfRange {
        date: NaiveDate,
        from: NaiveDate,
        to: NaiveDate,
    },

    #[error("an entry for {date} already exists in this period")]
    DuplicateDate { date: NaiveDate },

    #[error("{field}: {message}")]
    FieldValidation { field: &'static str, message: String },
}

impl EntryError {
    fn field(field: &'static str, message: impl Into<String>) -> Self {
        EntryError::FieldValidation {
            field,
            message: message.into(),
        }
    }
}

/// Check that `date` sits inside the period and is not already taken by
/// another live entry of the same period.
pub fn validate_entry(
    period_from: NaiveDate,
    period_to: NaiveDate,
    date: NaiveDate,
    exclude_entry_id: Option<i32>,
    existing: &[DailyEntry],
) -> Result<(), EntryError> {
    if date < period_from || date > period_to {
        return Err(EntryError::OutOfRange {
            date,
            from: period_from,
            to: period_to,
        });
    }

    let duplicate = existing
        .iter()
        .filter(|e| !e.is_deleted && Some(e.id) != exclude_entry_id)
        .find(|e| e.date == date);

    if duplicate.is_some() {
        return Err(EntryError::DuplicateDate { date });
    }

    Ok(())
}

/// Trailing zeros do not count, so `8.500` is accepted as `8.5`.
fn too_precise(value: Decimal) -> bool {
    value.normalize().scale() > MAX_SCALE
}

/// Field-level bounds. Every offending field produces its own error.
pub fn validate_fields(fields: &EntryFields) -> Result<(), Vec<EntryError>> {
    let mut errors = Vec::new();

    if fields.hours < Decimal::ZERO || fields.hours > MAX_DAILY_HOURS {
        errors.push(EntryError::field("hours", "must be between 0 and 24"));
    } else if too_precise(fields.hours) {
        errors.push(EntryError::field("hours", "must have at most 2 decimal places"));
    }

    let money = [
        ("mileage", fields.mileage),
        ("toll_charge", fields.toll_charge),
        ("parking_fee", fields.parking_fee),
        ("other_charges", fields.other_charges),
    ];
    for (name, value) in money {
        if value < Decimal::ZERO {
            errors.push(EntryError::field(name, "must not be negative"));
        } else if value > MAX_AMOUNT {
            errors.push(EntryError::field(name, format!("must be at most {}", MAX_AMOUNT)));
        } else if too_precise(value) {
            errors.push(EntryError::field(name, "must have at most 2 decimal places"));
        }
    }

    if let Some(comment) = &fields.comment {
        if comment.chars().count() > MAX_COMMENT_CHARS {
            errors.push(EntryError::field(
                "comment",
                format!("must be at most {} characters", MAX_COMMENT_CHARS),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
