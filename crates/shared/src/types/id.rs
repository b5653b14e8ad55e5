//! Typed IDs for type-safe record references.
//!
//! Using typed IDs prevents accidentally passing a `MemberId` where a
//! `DuesRecordId` is expected. Every table uses an auto-increment integer key.

use serde::{Deserialize, Serialize};

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i32);

        impl $name {
            /// Creates an ID from a raw key.
            #[must_use]
            pub const fn new(raw: i32) -> Self {
                Self(raw)
            }

            /// Returns the raw key.
            #[must_use]
            pub const fn into_inner(self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            fn from(raw: i32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

typed_id!(CashAccountId, "Unique identifier for a cash account (kasa).");
typed_id!(IncomeId, "Unique identifier for an income record.");
typed_id!(ExpenseId, "Unique identifier for an expense record.");
typed_id!(TransferId, "Unique identifier for a transfer between cash accounts.");
typed_id!(MemberId, "Unique identifier for a member.");
typed_id!(DuesRecordId, "Unique identifier for a per-member, per-year dues record.");
typed_id!(DuesPaymentId, "Unique identifier for a dues payment.");
typed_id!(AccrualId, "Unique identifier for an accrual entry.");
typed_id!(YearClosureId, "Unique identifier for a year-end closure.");
