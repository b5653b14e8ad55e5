//! Repositories over the ledger store.
//!
//! Every mutating operation checks the actor's permission, runs in one
//! transaction and hands its audit entries to the sink only after commit.

pub mod accrual;
pub mod cash_account;
pub mod closing;
pub mod dues;
pub mod expense;
pub mod income;
pub mod transfer;

pub use accrual::AccrualRepository;
pub use cash_account::{CashAccountRepository, CreateAccountInput};
pub use closing::ClosingRepository;
pub use dues::{
    AddPaymentInput, DuesRecordView, DuesRepository, PaymentChange, ReconcileOutcome,
};
pub use expense::{ExpenseRepository, MultiYearExpenseInput, NewExpenseInput};
pub use income::{IncomeRepository, MultiYearIncome, MultiYearIncomeInput, NewIncomeInput};
pub use transfer::{NewTransferInput, TransferRepository};

use chrono::NaiveDate;
use dernek_core::ledger::BatchId;
use dernek_shared::types::CashAccountId;
use serde::Serialize;

/// Filter for income and expense listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerFilter {
    /// Only records of this account.
    pub account_id: Option<CashAccountId>,
    /// Only records dated on or after.
    pub from: Option<NaiveDate>,
    /// Only records dated on or before.
    pub to: Option<NaiveDate>,
    /// Only records of this fiscal year.
    pub belongs_to_year: Option<i32>,
    /// Only records of this multi-year batch.
    pub batch_id: Option<BatchId>,
}

/// JSON snapshot of a row for the audit trail.
pub(crate) fn snapshot<T: Serialize>(model: &T) -> Option<String> {
    serde_json::to_string(model).ok()
}
