//! Accruals: money moved now that belongs to a later fiscal year.

pub mod error;
pub mod summary;
pub mod types;

pub use error::AccrualError;
pub use summary::{consumable, summarize, totals_by_kind, AccrualYearSummary, AccruedTotals};
pub use types::{AccrualEntry, AccrualKind, AccrualState, NewAccrual};
