//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Every failure of a ledger operation reaches the GUI/CLI layer as one of
/// these variants with a human-readable message.
#[derive(Debug, Error)]
pub enum AppError {
    /// Actor lacks the permission required by the operation.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict (e.g., duplicate entry, year already closed).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Record may not be modified through the requested path.
    #[error("Locked: {0}")]
    Locked(String),

    /// Derived ledger state disagrees with its source. Always a bug.
    #[error("Reconciliation invariant violated: {0}")]
    InvariantViolation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable error code shown next to the message.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Locked(_) => "LOCKED",
            Self::InvariantViolation(_) => "INVARIANT_VIOLATION",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the error signals a bug rather than a rejected request.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }

    /// Returns true if the request was rejected before any write happened.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Forbidden(_)
                | Self::NotFound(_)
                | Self::Validation(_)
                | Self::Conflict(_)
                | Self::Locked(_)
        )
    }
}
