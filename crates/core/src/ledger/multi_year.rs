//! Multi-year collection planning.
//!
//! One collection may cover several fiscal years. Each year becomes its own
//! record, tagged relative to the collection year.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::types::AccrualStatus;

/// Input of a multi-year collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiYearRequest {
    /// First covered year.
    pub start_year: i32,
    /// Last covered year, inclusive.
    pub end_year: i32,
    /// Amount booked for each year.
    pub per_year_amount: Decimal,
    /// Date the money was collected.
    pub collection_date: NaiveDate,
    /// Base description; the year is appended per record.
    pub description: String,
}

/// One record to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    /// Fiscal year the record belongs to.
    pub year: i32,
    /// Record amount.
    pub amount: Decimal,
    /// Classification relative to the collection year.
    pub status: AccrualStatus,
    /// Record description.
    pub description: String,
}

impl PlannedEntry {
    /// Returns true if the entry needs a matching accrual.
    #[must_use]
    pub const fn is_prepaid(&self) -> bool {
        matches!(self.status, AccrualStatus::Prepaid)
    }
}

impl MultiYearRequest {
    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidYearRange` or `NonPositiveAmount`.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.end_year < self.start_year {
            return Err(LedgerError::InvalidYearRange {
                start: self.start_year,
                end: self.end_year,
            });
        }
        if self.per_year_amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(self.per_year_amount));
        }
        Ok(())
    }

    /// Year the money was collected in.
    #[must_use]
    pub fn collection_year(&self) -> i32 {
        self.collection_date.year()
    }

    /// Number of covered years.
    #[must_use]
    pub fn year_count(&self) -> usize {
        usize::try_from(self.end_year - self.start_year + 1).unwrap_or(0)
    }
}

/// Expands a request into one entry per year, ascending.
///
/// # Errors
///
/// Returns the validation error of [`MultiYearRequest::validate`].
pub fn plan_multi_year(request: &MultiYearRequest) -> Result<Vec<PlannedEntry>, LedgerError> {
    request.validate()?;
    let collection_year = request.collection_year();
    let base = request.description.trim();

    Ok((request.start_year..=request.end_year)
        .map(|year| PlannedEntry {
            year,
            amount: request.per_year_amount,
            status: AccrualStatus::classify(year, collection_year),
            description: if base.is_empty() {
                format!("{year} yılı")
            } else {
                format!("{base} ({year} yılı)")
            },
        })
        .collect())
}
