//! Dues error types.

use dernek_shared::types::{DuesPaymentId, DuesRecordId, MemberId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors raised by dues tracking.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DuesError {
    /// Payment amount must be positive.
    #[error("Payment amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Annual dues must be positive.
    #[error("Annual dues amount must be positive, got {0}")]
    NonPositiveOwed(Decimal),

    /// Discount percentage outside [0, 100).
    #[error("Discount percentage must be in [0, 100), got {0}")]
    InvalidDiscount(Decimal),

    /// Unknown dues record.
    #[error("Dues record not found: {0}")]
    RecordNotFound(DuesRecordId),

    /// Unknown payment.
    #[error("Dues payment not found: {0}")]
    PaymentNotFound(DuesPaymentId),

    /// Unknown member.
    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    /// A record for the (member, year) pair already exists.
    #[error("Dues record already exists for member {member_id} in {year}")]
    DuplicateRecord {
        /// Member id.
        member_id: MemberId,
        /// Fiscal year.
        year: i32,
    },

    /// Multi-year collection amount does not match the year's obligation.
    #[error("Dues for {year} are {owed}, multi-year payment is {per_year}")]
    MultiYearAmountMismatch {
        /// Fiscal year.
        year: i32,
        /// Amount owed for the year.
        owed: Decimal,
        /// Amount collected per year.
        per_year: Decimal,
    },

    /// Dues for the year are already paid in full.
    #[error("Dues for member {member_id} in {year} are already complete")]
    AlreadyComplete {
        /// Member id.
        member_id: MemberId,
        /// Fiscal year.
        year: i32,
    },

    /// Promotion flag, status and linked income disagree.
    #[error("Dues record {record_id}: {detail}")]
    InvariantViolation {
        /// Offending record.
        record_id: DuesRecordId,
        /// What disagrees.
        detail: String,
    },
}

impl DuesError {
    /// Error category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NonPositiveAmount(_)
            | Self::NonPositiveOwed(_)
            | Self::InvalidDiscount(_)
            | Self::MultiYearAmountMismatch { .. } => ErrorKind::Validation,
            Self::RecordNotFound(_) | Self::PaymentNotFound(_) | Self::MemberNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::DuplicateRecord { .. } | Self::AlreadyComplete { .. } => ErrorKind::Conflict,
            Self::InvariantViolation { .. } => ErrorKind::InvariantViolation,
        }
    }
}
