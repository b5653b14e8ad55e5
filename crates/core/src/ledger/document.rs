//! Document numbers and multi-year batch ids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::types::LedgerKind;

/// Returns the next unused document number for `kind`.
///
/// Numbers are the ledger prefix followed by six digits; the next number is
/// the largest numeric suffix among `existing` plus one. Values that do not
/// carry the prefix or a numeric suffix are ignored.
///
/// # Errors
///
/// Returns `DocumentNumbersExhausted` when the largest suffix is `u32::MAX`.
pub fn next_document_number<'a>(
    kind: LedgerKind,
    existing: impl IntoIterator<Item = &'a str>,
) -> Result<String, LedgerError> {
    let prefix = kind.document_prefix();
    let max = existing
        .into_iter()
        .filter_map(|number| number.strip_prefix(prefix))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    let next = max
        .checked_add(1)
        .ok_or(LedgerError::DocumentNumbersExhausted(kind))?;
    Ok(format!("{prefix}{next:06}"))
}

/// Identifier shared by every record created in one multi-year call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId {
    /// Collection year of the batch.
    pub year: i32,
    /// Position among the batches of that year, from 1.
    pub sequence: u32,
}

impl BatchId {
    /// Next batch id for `year` given the ids already stored.
    ///
    /// # Errors
    ///
    /// Returns `BatchIdsExhausted` when the year's largest sequence is
    /// `u32::MAX`.
    pub fn next<'a>(
        year: i32,
        existing: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, LedgerError> {
        let sequence = existing
            .into_iter()
            .filter_map(|raw| raw.parse::<Self>().ok())
            .filter(|batch| batch.year == year)
            .map(|batch| batch.sequence)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or(LedgerError::BatchIdsExhausted(year))?;
        Ok(Self { year, sequence })
    }

    /// Prefix shared by every batch id of `year`, for store-side filtering.
    #[must_use]
    pub fn year_prefix(year: i32) -> String {
        format!("GRUP_{year}_")
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GRUP_{}_{}", self.year, self.sequence)
    }
}

impl FromStr for BatchId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::UnknownLabel(s.to_string());
        let rest = s.strip_prefix("GRUP_").ok_or_else(invalid)?;
        let (year, sequence) = rest.split_once('_').ok_or_else(invalid)?;
        Ok(Self {
            year: year.parse().map_err(|_| invalid())?,
            sequence: sequence.parse().map_err(|_| invalid())?,
        })
    }
}
