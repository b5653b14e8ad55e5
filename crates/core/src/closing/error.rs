//! Closing error types.

use thiserror::Error;

use crate::error::ErrorKind;

/// Errors raised by year-end closing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClosingError {
    /// Every account in scope is already closed for the year.
    #[error("Fiscal year {0} is already closed")]
    AlreadyClosed(i32),

    /// Year outside the representable calendar.
    #[error("Invalid fiscal year: {0}")]
    InvalidYear(i32),

    /// An earlier closure already covers a later date.
    #[error("Cannot close {year}: account was last closed on {last_closure}")]
    ClosedLater {
        /// Requested year.
        year: i32,
        /// Last closure date of the account.
        last_closure: chrono::NaiveDate,
    },

    /// No active cash accounts to close.
    #[error("No active cash accounts to close")]
    NoAccounts,
}

impl ClosingError {
    /// Error category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyClosed(_) | Self::ClosedLater { .. } => ErrorKind::Conflict,
            Self::InvalidYear(_) | Self::NoAccounts => ErrorKind::Validation,
        }
    }
}
