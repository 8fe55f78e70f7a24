pub mod aggregation;
pub mod approval;
pub mod entry_validator;
pub mod period_validator;
pub mod service;
pub mod status;

pub use aggregation::{compute_totals, recalculate, RecalcOutcome, Totals};
pub use approval::ApprovalError;
pub use entry_validator::{validate_entry, validate_fields, EntryError};
pub use period_validator::{validate_new_period, validate_updated_period, PeriodError};
pub use service::{EntryMutation, TimesheetService};
pub use status::{TimesheetStatus, Transition};
