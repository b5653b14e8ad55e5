//! Actor context and permissions.
//!
//! Every mutating ledger operation receives an explicit [`ActorContext`];
//! the core never reads a global "current user".

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorKind;

/// User roles within the association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access.
    Admin,
    /// Can book money movements, collect dues and close years.
    Accountant,
    /// Can collect dues only.
    Secretary,
    /// Read-only access.
    Viewer,
}

/// A single capability checked by ledger operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Record or remove dues payments, create dues records.
    CollectDues,
    /// Generate dues records in bulk.
    EditDues,
    /// Create income records.
    CreateIncome,
    /// Delete income records.
    DeleteIncome,
    /// Create expense records.
    CreateExpense,
    /// Delete expense records.
    DeleteExpense,
    /// Create or deactivate cash accounts.
    OperateCashAccount,
    /// Move money between cash accounts.
    Transfer,
    /// Confirm a year-end closure.
    CloseYear,
}

impl UserRole {
    /// Returns the permission set granted by the role template.
    #[must_use]
    pub fn default_permissions(&self) -> BTreeSet<Permission> {
        use Permission::{
            CloseYear, CollectDues, CreateExpense, CreateIncome, DeleteExpense, DeleteIncome,
            EditDues, OperateCashAccount, Transfer,
        };

        match self {
            Self::Admin | Self::Accountant => [
                CollectDues,
                EditDues,
                CreateIncome,
                DeleteIncome,
                CreateExpense,
                DeleteExpense,
                OperateCashAccount,
                Transfer,
                CloseYear,
            ]
            .into_iter()
            .collect(),
            Self::Secretary => [CollectDues].into_iter().collect(),
            Self::Viewer => BTreeSet::new(),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Accountant => write!(f, "accountant"),
            Self::Secretary => write!(f, "secretary"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CollectDues => "collect_dues",
            Self::EditDues => "edit_dues",
            Self::CreateIncome => "create_income",
            Self::DeleteIncome => "delete_income",
            Self::CreateExpense => "create_expense",
            Self::DeleteExpense => "delete_expense",
            Self::OperateCashAccount => "operate_cash_account",
            Self::Transfer => "transfer",
            Self::CloseYear => "close_year",
        };
        f.write_str(name)
    }
}

/// Who is performing an operation and what they may do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    /// Name recorded in the audit trail.
    pub actor: String,
    /// Role of the actor.
    pub role: UserRole,
    /// Effective permissions.
    pub permissions: BTreeSet<Permission>,
}

impl ActorContext {
    /// Creates a context with the role's default permissions.
    #[must_use]
    pub fn new(actor: impl Into<String>, role: UserRole) -> Self {
        Self {
            actor: actor.into(),
            role,
            permissions: role.default_permissions(),
        }
    }

    /// Creates a context with an explicit permission set.
    #[must_use]
    pub fn with_permissions(
        actor: impl Into<String>,
        role: UserRole,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        Self {
            actor: actor.into(),
            role,
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Context used by automated jobs.
    #[must_use]
    pub fn system() -> Self {
        Self::new("Sistem", UserRole::Admin)
    }

    /// Returns true if the actor holds the permission.
    #[must_use]
    pub fn can(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Fails unless the actor holds the permission.
    pub fn require(&self, permission: Permission) -> Result<(), PermissionError> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(PermissionError::Missing {
                actor: self.actor.clone(),
                permission,
            })
        }
    }
}

/// Permission failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PermissionError {
    /// The actor lacks the permission.
    #[error("{actor} lacks permission {permission}")]
    Missing {
        /// Actor name.
        actor: String,
        /// Permission that was required.
        permission: Permission,
    },
}

impl PermissionError {
    /// Error category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Forbidden
    }
}
