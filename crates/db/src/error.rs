//! Repository error type.

use dernek_core::accrual::AccrualError;
use dernek_core::auth::PermissionError;
use dernek_core::closing::ClosingError;
use dernek_core::dues::DuesError;
use dernek_core::ledger::LedgerError;
use dernek_core::ErrorKind;
use dernek_shared::AppError;
use sea_orm::DbErr;

/// Errors returned by every repository operation.
///
/// An error returned from inside a transaction drops the transaction
/// uncommitted, so nothing the operation wrote survives.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Actor lacks a permission.
    #[error(transparent)]
    Permission(#[from] PermissionError),

    /// Cash account, income, expense or transfer rule.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Dues rule.
    #[error(transparent)]
    Dues(#[from] DuesError),

    /// Accrual rule.
    #[error(transparent)]
    Accrual(#[from] AccrualError),

    /// Year-end closing rule.
    #[error(transparent)]
    Closing(#[from] ClosingError),

    /// A stored row holds a value the domain does not recognise.
    #[error("Corrupt row in {table}: {detail}")]
    Corrupt {
        /// Table of the row.
        table: &'static str,
        /// What could not be read.
        detail: String,
    },

    /// Report could not be serialised.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl StoreError {
    /// Domain error category, if the error is a domain rejection.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Permission(e) => Some(e.kind()),
            Self::Ledger(e) => Some(e.kind()),
            Self::Dues(e) => Some(e.kind()),
            Self::Accrual(e) => Some(e.kind()),
            Self::Closing(e) => Some(e.kind()),
            Self::Corrupt { .. } | Self::Serialization(_) | Self::Database(_) => None,
        }
    }

    pub(crate) fn corrupt(table: &'static str, detail: impl Into<String>) -> Self {
        Self::Corrupt {
            table,
            detail: detail.into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err.kind() {
            Some(ErrorKind::Validation) => Self::Validation(message),
            Some(ErrorKind::NotFound) => Self::NotFound(message),
            Some(ErrorKind::Conflict) => Self::Conflict(message),
            Some(ErrorKind::Locked) => Self::Locked(message),
            Some(ErrorKind::Forbidden) => Self::Forbidden(message),
            Some(ErrorKind::InvariantViolation) => Self::InvariantViolation(message),
            None => match err {
                StoreError::Database(_) => Self::Database(message),
                _ => Self::Internal(message),
            },
        }
    }
}
