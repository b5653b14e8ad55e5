//! Error classification shared by all core modules.

use serde::Serialize;

/// Coarse category of a core error, used to map onto `AppError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Input rejected before any write.
    Validation,
    /// Referenced record does not exist.
    NotFound,
    /// Duplicate record or terminal state already reached.
    Conflict,
    /// Record may not be modified through the requested path.
    Locked,
    /// Actor lacks a permission.
    Forbidden,
    /// Derived state disagrees with its source. Always a bug.
    InvariantViolation,
}
