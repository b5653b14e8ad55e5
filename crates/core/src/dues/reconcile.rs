//! Dues recomputation and the promotion rule.
//!
//! After every payment change the record's totals are recomputed from the
//! full payment set and [`reconcile_action`] decides the single ledger side
//! effect, if any. A record is promoted if and only if it is complete.

use dernek_shared::types::{DuesRecordId, IncomeId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DuesError;
use super::types::{DuesStatus, PromotionFlag};

/// Totals derived from the payment set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuesTotals {
    /// Sum of payments.
    pub paid: Decimal,
    /// `owed - paid`; negative on overpayment.
    pub remaining: Decimal,
    /// Status after the change.
    pub status: DuesStatus,
}

/// Recomputes totals for a record owing `owed` with the given payments.
#[must_use]
pub fn recompute(owed: Decimal, payments: &[Decimal]) -> DuesTotals {
    let paid: Decimal = payments.iter().copied().sum();
    DuesTotals {
        paid,
        remaining: owed - paid,
        status: DuesStatus::from_amounts(owed, paid),
    }
}

/// Linkage state of a dues record before reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionState {
    /// Persisted flag.
    pub flag: PromotionFlag,
    /// Linked income id.
    pub income_id: Option<IncomeId>,
}

impl PromotionState {
    /// State of a record with no linked income.
    pub const UNPROMOTED: Self = Self {
        flag: PromotionFlag::NotPromoted,
        income_id: None,
    };

    /// State after linking `income_id`.
    #[must_use]
    pub const fn promoted(income_id: IncomeId) -> Self {
        Self {
            flag: PromotionFlag::Promoted,
            income_id: Some(income_id),
        }
    }
}

/// Ledger side effect required to restore the promotion invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Create and link one income of `amount`.
    Promote {
        /// Income amount; always the owed amount.
        amount: Decimal,
    },
    /// Delete the linked income and clear the link.
    Demote {
        /// Income to delete.
        income_id: IncomeId,
    },
    /// Nothing to do.
    Nothing,
}

/// Decides the side effect for a record in `state` whose totals are `totals`.
///
/// # Errors
///
/// Returns [`DuesError::InvariantViolation`] when the flag and the link
/// disagree, which means an earlier operation left the record inconsistent.
pub fn reconcile_action(
    record_id: DuesRecordId,
    owed: Decimal,
    totals: &DuesTotals,
    state: PromotionState,
) -> Result<ReconcileAction, DuesError> {
    let promoted = match (state.flag, state.income_id) {
        (PromotionFlag::Promoted, Some(income_id)) => Some(income_id),
        (PromotionFlag::NotPromoted, None) => None,
        (PromotionFlag::Promoted, None) => {
            return Err(DuesError::InvariantViolation {
                record_id,
                detail: "promoted without a linked income".to_string(),
            });
        }
        (PromotionFlag::NotPromoted, Some(income_id)) => {
            return Err(DuesError::InvariantViolation {
                record_id,
                detail: format!("linked to income {income_id} but not promoted"),
            });
        }
    };

    Ok(match (totals.status.is_complete(), promoted) {
        (true, None) => ReconcileAction::Promote { amount: owed },
        (false, Some(income_id)) => ReconcileAction::Demote { income_id },
        _ => ReconcileAction::Nothing,
    })
}

/// Checks the stored record against its payments and linked income.
///
/// `linked_amount` is the amount of the linked income row, or `None` if the
/// row does not exist.
///
/// # Errors
///
/// Returns [`DuesError::InvariantViolation`] describing the first mismatch.
pub fn verify_record(
    record_id: DuesRecordId,
    owed: Decimal,
    stored_remaining: Decimal,
    stored_status: DuesStatus,
    payments: &[Decimal],
    state: PromotionState,
    linked_amount: Option<Decimal>,
) -> Result<(), DuesError> {
    let violation = |detail: String| DuesError::InvariantViolation { record_id, detail };
    let totals = recompute(owed, payments);

    if stored_remaining != totals.remaining {
        return Err(violation(format!(
            "remaining is {stored_remaining}, payments imply {}",
            totals.remaining
        )));
    }
    if stored_status != totals.status {
        return Err(violation(format!(
            "status is {stored_status}, payments imply {}",
            totals.status
        )));
    }

    let action = reconcile_action(record_id, owed, &totals, state)?;
    if action != ReconcileAction::Nothing {
        return Err(violation(format!(
            "status {stored_status} with promotion flag {:?}",
            state.flag
        )));
    }

    match (state.income_id, linked_amount) {
        (Some(income_id), None) => Err(violation(format!("linked income {income_id} is missing"))),
        (Some(income_id), Some(amount)) if amount != owed => Err(violation(format!(
            "linked income {income_id} is {amount}, owed is {owed}"
        ))),
        _ => Ok(()),
    }
}
