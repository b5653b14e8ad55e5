//! Accrual error types.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors raised by the accrual registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccrualError {
    /// Accruals must belong to a year after the collection year.
    #[error("Accrual for {belongs_to_year} collected in {collection_year} is not in the future")]
    NotInFuture {
        /// Year the money moved.
        collection_year: i32,
        /// Year the money belongs to.
        belongs_to_year: i32,
    },

    /// Amount must be positive.
    #[error("Accrual amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Persisted label not recognised.
    #[error("Unknown accrual label: {0}")]
    UnknownLabel(String),
}

impl AccrualError {
    /// Error category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
