pub mod entry;
pub mod entry_input;
pub mod period;
pub mod period_input;
pub mod response;

pub use entry::{DailyEntry, EntryFields, EntryMutationData, NewEntry};
pub use entry_input::{CreateEntryInput, UpdateEntryInput};
pub use period::{NewPeriod, PeriodWithEntries, TimesheetPeriod};
pub use period_input::{ApprovePeriodInput, CreatePeriodInput, DenyPeriodInput, PeriodFilter, UpdatePeriodInput};
pub use response::ApiResponse;
