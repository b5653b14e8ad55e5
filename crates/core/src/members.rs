//! Member projection read by the dues tracker.

use std::fmt;
use std::str::FromStr;

use dernek_shared::types::MemberId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Membership status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    /// Active member; included in bulk dues generation.
    Active,
    /// Passive member.
    Passive,
    /// Member has left the association.
    Departed,
}

impl MemberStatus {
    /// Persisted label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Aktif",
            Self::Passive => "Pasif",
            Self::Departed => "Ayrıldı",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Aktif" => Ok(Self::Active),
            "Pasif" => Ok(Self::Passive),
            "Ayrıldı" => Ok(Self::Departed),
            other => Err(format!("unknown member status: {other}")),
        }
    }
}

/// The slice of a member record the ledger needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProjection {
    /// Member id.
    pub id: MemberId,
    /// Display name.
    pub name: String,
    /// Custom annual dues overriding every default.
    pub custom_annual_dues: Option<Decimal>,
    /// Discount applied to the default amount, in percent.
    pub discount_percent: Option<Decimal>,
    /// Membership status.
    pub status: MemberStatus,
}

impl MemberProjection {
    /// Returns true for active members.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels_parse_back() {
        for status in [MemberStatus::Active, MemberStatus::Passive, MemberStatus::Departed] {
            assert_eq!(status.as_str().parse::<MemberStatus>(), Ok(status));
        }
        assert!("Silindi".parse::<MemberStatus>().is_err());
    }
}
