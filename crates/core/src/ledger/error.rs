//! Ledger error types.

use chrono::NaiveDate;
use dernek_shared::types::{CashAccountId, DuesRecordId, ExpenseId, IncomeId, TransferId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::LedgerKind;
use crate::error::ErrorKind;

/// Errors raised by cash account, income, expense and transfer operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Amount must be positive.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Multi-year range runs backwards.
    #[error("End year {end} is before start year {start}")]
    InvalidYearRange {
        /// First year.
        start: i32,
        /// Last year.
        end: i32,
    },

    /// Transfer source and destination are the same account.
    #[error("Cannot transfer from cash account {0} to itself")]
    SameAccount(CashAccountId),

    /// Cash account name is blank.
    #[error("Cash account name must not be empty")]
    EmptyAccountName,

    /// Cash account is deactivated.
    #[error("Cash account {0} is inactive")]
    AccountInactive(CashAccountId),

    /// Balance requested for a date already folded into the opening balance.
    #[error("Balance as of {as_of} predates the last closure on {closed_on}")]
    AsOfBeforeClosure {
        /// Requested date.
        as_of: NaiveDate,
        /// Last closure date of the account.
        closed_on: NaiveDate,
    },

    /// Persisted label not recognised.
    #[error("Unknown label: {0}")]
    UnknownLabel(String),

    // ========== Not Found Errors ==========
    /// Unknown cash account.
    #[error("Cash account not found: {0}")]
    AccountNotFound(CashAccountId),

    /// Unknown cash account name.
    #[error("Cash account not found: {0}")]
    AccountNameNotFound(String),

    /// Unknown income record.
    #[error("Income record not found: {0}")]
    IncomeNotFound(IncomeId),

    /// Unknown expense record.
    #[error("Expense record not found: {0}")]
    ExpenseNotFound(ExpenseId),

    /// Unknown transfer.
    #[error("Transfer not found: {0}")]
    TransferNotFound(TransferId),

    // ========== Conflict Errors ==========
    /// Cash account name already used.
    #[error("Cash account name already exists: {0}")]
    DuplicateAccountName(String),

    /// Document numbering ran past its largest sequence.
    #[error("No {} document numbers left", .0.document_prefix())]
    DocumentNumbersExhausted(LedgerKind),

    /// Multi-year batch ids of the year ran past their largest sequence.
    #[error("No batch ids left for {0}")]
    BatchIdsExhausted(i32),

    // ========== Locked Errors ==========
    /// Income is the promoted income of a dues record.
    #[error(
        "Income {income_id} belongs to dues record {dues_id}; remove the dues payment instead"
    )]
    DuesIncomeLocked {
        /// Income record.
        income_id: IncomeId,
        /// Dues record it was promoted from.
        dues_id: DuesRecordId,
    },

    /// Dues income is only removed through the dues tracker.
    #[error("Income {0} is a dues income; remove the dues payment instead")]
    DuesCategoryLocked(IncomeId),

    /// Record dated inside a period already folded into the opening balance.
    #[error("Cash account {account} is closed up to {closed_on}; {date} can no longer change")]
    PeriodClosed {
        /// Account the record is booked on.
        account: CashAccountId,
        /// Date of the record.
        date: NaiveDate,
        /// Last closure date of the account.
        closed_on: NaiveDate,
    },
}

impl LedgerError {
    /// Error category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NonPositiveAmount(_)
            | Self::InvalidYearRange { .. }
            | Self::SameAccount(_)
            | Self::EmptyAccountName
            | Self::AccountInactive(_)
            | Self::AsOfBeforeClosure { .. }
            | Self::UnknownLabel(_) => ErrorKind::Validation,
            Self::AccountNotFound(_)
            | Self::AccountNameNotFound(_)
            | Self::IncomeNotFound(_)
            | Self::ExpenseNotFound(_)
            | Self::TransferNotFound(_) => ErrorKind::NotFound,
            Self::DuplicateAccountName(_)
            | Self::DocumentNumbersExhausted(_)
            | Self::BatchIdsExhausted(_) => ErrorKind::Conflict,
            Self::DuesIncomeLocked { .. }
            | Self::DuesCategoryLocked(_)
            | Self::PeriodClosed { .. } => ErrorKind::Locked,
        }
    }
}
