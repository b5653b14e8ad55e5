//! Per-member, per-year dues tracking.
//!
//! This module holds the dues state machine:
//! - Status derivation (Missing, Partial, Complete) from the payment total
//! - The promotion rule that keeps the income ledger in step with dues
//! - Annual amount resolution from member data and defaults

pub mod amount;
pub mod error;
pub mod reconcile;
pub mod types;

#[cfg(test)]
mod reconcile_props;

pub use amount::resolve_annual_dues;
pub use error::DuesError;
pub use reconcile::{
    reconcile_action, recompute, verify_record, DuesTotals, PromotionState, ReconcileAction,
};
pub use types::{
    promotion_description, DuesStatus, PaymentMethod, PromotionFlag, DEFAULT_PAYMENT_NOTE,
};
