//! Income and expense ledger types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Fiscal-year classification of a record relative to its collection year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccrualStatus {
    /// Belongs to the year it was collected in.
    #[default]
    Normal,
    /// Collected in advance for a later year.
    Prepaid,
    /// Collected late for an earlier year.
    Retroactive,
}

impl AccrualStatus {
    /// Classifies a record belonging to `belongs_to_year` collected in `collection_year`.
    #[must_use]
    pub fn classify(belongs_to_year: i32, collection_year: i32) -> Self {
        match belongs_to_year.cmp(&collection_year) {
            std::cmp::Ordering::Equal => Self::Normal,
            std::cmp::Ordering::Greater => Self::Prepaid,
            std::cmp::Ordering::Less => Self::Retroactive,
        }
    }

    /// Persisted label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Prepaid => "PEŞİN",
            Self::Retroactive => "GERİYE_DÖNÜK",
        }
    }
}

impl fmt::Display for AccrualStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccrualStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NORMAL" => Ok(Self::Normal),
            "PEŞİN" => Ok(Self::Prepaid),
            "GERİYE_DÖNÜK" => Ok(Self::Retroactive),
            other => Err(LedgerError::UnknownLabel(other.to_string())),
        }
    }
}

/// Income categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncomeCategory {
    /// Membership dues.
    Dues,
    /// Rent.
    Rent,
    /// Donation.
    Donation,
    /// Wedding hall rental.
    Wedding,
    /// Henna night rental.
    Henna,
    /// Meeting.
    Meeting,
    /// Invitation.
    Invitation,
    /// Anything else.
    Other,
}

impl IncomeCategory {
    /// Persisted label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dues => "AİDAT",
            Self::Rent => "KİRA",
            Self::Donation => "BAĞIŞ",
            Self::Wedding => "DÜĞÜN",
            Self::Henna => "KINA",
            Self::Meeting => "TOPLANTI",
            Self::Invitation => "DAVET",
            Self::Other => "DİĞER",
        }
    }

    /// Returns true if rows of this category feed the dues tracker.
    #[must_use]
    pub const fn is_dues(&self) -> bool {
        matches!(self, Self::Dues)
    }
}

impl fmt::Display for IncomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncomeCategory {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AİDAT" => Ok(Self::Dues),
            "KİRA" => Ok(Self::Rent),
            "BAĞIŞ" => Ok(Self::Donation),
            "DÜĞÜN" => Ok(Self::Wedding),
            "KINA" => Ok(Self::Henna),
            "TOPLANTI" => Ok(Self::Meeting),
            "DAVET" => Ok(Self::Invitation),
            "DİĞER" => Ok(Self::Other),
            other => Err(LedgerError::UnknownLabel(other.to_string())),
        }
    }
}

/// Which ledger a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerKind {
    /// `gelirler`.
    Income,
    /// `giderler`.
    Expense,
}

impl LedgerKind {
    /// Document number prefix.
    #[must_use]
    pub const fn document_prefix(&self) -> &'static str {
        match self {
            Self::Income => "GEL",
            Self::Expense => "GID",
        }
    }

    /// Table holding the records.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        match self {
            Self::Income => "gelirler",
            Self::Expense => "giderler",
        }
    }
}
