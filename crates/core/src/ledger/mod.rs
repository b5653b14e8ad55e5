//! Cash account, income and expense ledger logic.
//!
//! This module implements the store-independent parts of the ledgers:
//! - Accrual classification of records relative to the collection year
//! - Document numbering and multi-year batch ids
//! - Multi-year collection planning
//! - Physical and free balance arithmetic

pub mod balance;
pub mod document;
pub mod error;
pub mod multi_year;
pub mod types;

#[cfg(test)]
mod balance_props;

pub use balance::{
    balance_window, ensure_open, CashBalance, DateWindow, FreeBalance, MovementTotals,
};
pub use document::{next_document_number, BatchId};
pub use error::LedgerError;
pub use multi_year::{plan_multi_year, MultiYearRequest, PlannedEntry};
pub use types::{AccrualStatus, IncomeCategory, LedgerKind};
