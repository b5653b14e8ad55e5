//! Year-end closing and carryover.
//!
//! A closure snapshots every cash account at December 31st: the physical
//! balance becomes next year's opening balance and the free balance (net of
//! accruals for later years) becomes next year's free opening balance.

pub mod error;
pub mod service;
pub mod types;

pub use error::ClosingError;
pub use service::{year_end, ClosingService};
pub use types::{
    AccountClosure, AccountFigures, ClosureReport, ClosureTotals, ClosureWarning,
    ClosureWarningKind,
};
