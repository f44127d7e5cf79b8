//! Authentication provider seam.
//!
//! The monitoring core never inspects credentials itself. Whoever hosts it
//! supplies an [`AuthProvider`]; the core only tracks which authenticated
//! operators are online.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authentication failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Unknown employee id or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Session id is not logged in.
    #[error("session {0} is not logged in")]
    UnknownSession(String),
}

/// Operator role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OperatorRole {
    /// Full administrative access.
    Admin,
    /// Pump operator.
    #[default]
    Operator,
    /// Read-only observer.
    Viewer,
}

/// An authenticated operator. Never carries a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    /// Employee number or login name.
    pub employee_id: String,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: OperatorRole,
    /// Department.
    pub department: String,
    /// Job title.
    pub position: String,
    /// When this login happened.
    pub login_time: DateTime<Utc>,
}

/// Verifies operator credentials.
///
/// Implementations must be shareable across request workers.
pub trait AuthProvider: Send + Sync {
    /// Check credentials and return the operator on success.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidCredentials`] for any mismatch; the error
    /// does not reveal whether the id or the password was wrong.
    fn authenticate(&self, employee_id: &str, password: &str) -> Result<Operator, AuthError>;
}
