//! Core business logic for the association ledger.
//!
//! This crate contains pure business logic with ZERO database dependencies.
//! All domain types, validation rules, and reconciliation decisions live here;
//! `dernek-db` applies them inside database transactions.
//!
//! # Modules
//!
//! - `ledger` - Income/expense records, accrual tagging, cash balances
//! - `dues` - Per-member dues state machine and promotion rule
//! - `accrual` - Revenue and expense collected ahead of its fiscal year
//! - `closing` - Year-end closure evaluation and warnings
//! - `auth` - Explicit actor context and permissions
//! - `audit` - Audit journal and sinks
//! - `sync` - Deferred operations queued for replication

pub mod accrual;
pub mod audit;
pub mod auth;
pub mod closing;
pub mod dues;
pub mod error;
pub mod ledger;
pub mod members;
pub mod sync;

pub use error::ErrorKind;
