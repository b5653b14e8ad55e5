//! Database layer for the ledger engine.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the association's schema
//! - One repository per ledger component, each operation in one transaction
//! - Store backend selection and database migrations

pub mod entities;
pub mod error;
pub mod members;
pub mod migration;
pub mod repositories;
pub mod store;

pub use error::StoreError;
pub use members::{DbMemberDirectory, MemberDirectory, NewMemberInput, StaticMemberDirectory};
pub use repositories::{
    AccrualRepository, CashAccountRepository, ClosingRepository, DuesRepository,
    ExpenseRepository, IncomeRepository, LedgerFilter, TransferRepository,
};
pub use store::{Store, StoreBackend};
