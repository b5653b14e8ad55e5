//! Accrual domain types.

use std::fmt;
use std::str::FromStr;

use dernek_shared::types::AccrualId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::AccrualError;
use crate::ledger::LedgerKind;

/// Whether the accrual came from an income or an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccrualKind {
    /// Income collected in advance.
    Income,
    /// Expense paid in advance.
    Expense,
}

impl AccrualKind {
    /// Persisted label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "GELİR",
            Self::Expense => "GİDER",
        }
    }

    /// Table of the source record.
    #[must_use]
    pub const fn source_table(&self) -> &'static str {
        match self {
            Self::Income => LedgerKind::Income.table(),
            Self::Expense => LedgerKind::Expense.table(),
        }
    }
}

impl From<LedgerKind> for AccrualKind {
    fn from(kind: LedgerKind) -> Self {
        match kind {
            LedgerKind::Income => Self::Income,
            LedgerKind::Expense => Self::Expense,
        }
    }
}

impl FromStr for AccrualKind {
    type Err = AccrualError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GELİR" => Ok(Self::Income),
            "GİDER" => Ok(Self::Expense),
            other => Err(AccrualError::UnknownLabel(other.to_string())),
        }
    }
}

/// Lifecycle of an accrual entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccrualState {
    /// Still earmarked for a later year.
    Active,
    /// Its year has been closed.
    Consumed,
    /// Source record was deleted.
    Reversed,
}

impl AccrualState {
    /// Persisted label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "AKTİF",
            Self::Consumed => "GERÇEKLEŞTİ",
            Self::Reversed => "İPTAL",
        }
    }
}

impl fmt::Display for AccrualState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccrualState {
    type Err = AccrualError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AKTİF" => Ok(Self::Active),
            "GERÇEKLEŞTİ" => Ok(Self::Consumed),
            "İPTAL" => Ok(Self::Reversed),
            other => Err(AccrualError::UnknownLabel(other.to_string())),
        }
    }
}

/// Registration request for a prepaid record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccrual {
    /// Income or expense.
    pub kind: AccrualKind,
    /// Source record id in the kind's table.
    pub source_id: i32,
    /// Year the money moved.
    pub collection_year: i32,
    /// Year the money belongs to.
    pub belongs_to_year: i32,
    /// Amount.
    pub amount: Decimal,
}

impl NewAccrual {
    /// Checks that the entry really belongs to a later year.
    ///
    /// # Errors
    ///
    /// Returns `NotInFuture` or `NonPositiveAmount`.
    pub fn validate(&self) -> Result<(), AccrualError> {
        if self.belongs_to_year <= self.collection_year {
            return Err(AccrualError::NotInFuture {
                collection_year: self.collection_year,
                belongs_to_year: self.belongs_to_year,
            });
        }
        if self.amount <= Decimal::ZERO {
            return Err(AccrualError::NonPositiveAmount(self.amount));
        }
        Ok(())
    }
}

/// A stored accrual entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualEntry {
    /// Entry id.
    pub id: AccrualId,
    /// Income or expense.
    pub kind: AccrualKind,
    /// Source record id.
    pub source_id: i32,
    /// Year the money moved.
    pub collection_year: i32,
    /// Year the money belongs to.
    pub belongs_to_year: i32,
    /// Amount.
    pub amount: Decimal,
    /// Lifecycle state.
    pub state: AccrualState,
}

impl AccrualEntry {
    /// Returns true while the entry is earmarked.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, AccrualState::Active)
    }
}
