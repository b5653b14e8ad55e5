//! Dues domain types.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Note stored on a payment when the operator leaves it empty.
pub const DEFAULT_PAYMENT_NOTE: &str = "Aidattan gelen ödeme";

/// Payment progress of a dues record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DuesStatus {
    /// Paid in full (or overpaid).
    Complete,
    /// Something paid, something still owed.
    Partial,
    /// Nothing paid.
    Missing,
}

impl DuesStatus {
    /// Three-way comparison of the paid total against the owed amount.
    #[must_use]
    pub fn from_amounts(owed: Decimal, paid: Decimal) -> Self {
        if paid >= owed {
            Self::Complete
        } else if paid > Decimal::ZERO {
            Self::Partial
        } else {
            Self::Missing
        }
    }

    /// Persisted label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "Tamamlandı",
            Self::Partial => "Kısmi",
            Self::Missing => "Eksik",
        }
    }

    /// Returns true for [`DuesStatus::Complete`].
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for DuesStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuesStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Tamamlandı" => Ok(Self::Complete),
            "Kısmi" => Ok(Self::Partial),
            "Eksik" => Ok(Self::Missing),
            other => Err(format!("unknown dues status: {other}")),
        }
    }
}

/// Whether a dues record has been materialised as income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PromotionFlag {
    /// No linked income.
    #[default]
    NotPromoted,
    /// Linked income exists.
    Promoted,
}

impl PromotionFlag {
    /// Persisted label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotPromoted => "",
            Self::Promoted => "Aktarıldı",
        }
    }

    /// Returns true for [`PromotionFlag::Promoted`].
    #[must_use]
    pub const fn is_promoted(&self) -> bool {
        matches!(self, Self::Promoted)
    }
}

impl FromStr for PromotionFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Ok(Self::NotPromoted),
            "Aktarıldı" => Ok(Self::Promoted),
            other => Err(format!("unknown promotion flag: {other}")),
        }
    }
}

/// How a payment was collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Cash at the till.
    #[default]
    Cash,
    /// Bank transfer.
    Bank,
    /// Credit card.
    CreditCard,
    /// Part of a multi-year collection.
    MultiYear,
}

impl PaymentMethod {
    /// Persisted label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "Nakit",
            Self::Bank => "Banka",
            Self::CreditCard => "Kredi Kartı",
            Self::MultiYear => "Çoklu Yıl",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Nakit" => Ok(Self::Cash),
            "Banka" => Ok(Self::Bank),
            "Kredi Kartı" => Ok(Self::CreditCard),
            "Çoklu Yıl" => Ok(Self::MultiYear),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// Description of the income created when a dues record is promoted.
#[must_use]
pub fn promotion_description(member_name: &str, year: i32) -> String {
    format!("{member_name} - {year} Yılı Aidatı")
}
