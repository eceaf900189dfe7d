//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures found while interpreting
/// input (validation, lookups). Persistence failures belong to the store.
///
/// The `Display` output is what clients see in the `error` field of the
/// response envelope, so messages are written for humans.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Required input was missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// A date string did not match `YYYY-MM-DD`.
    ///
    /// Kept apart from `Validation`: clients have always received a server
    /// error for this case and the API layer preserves that status.
    #[error("{0}")]
    InvalidDate(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// No record exists for the requested identifier.
    #[error("Item not found")]
    NotFound,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_date(msg: impl Into<String>) -> Self {
        Self::InvalidDate(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
