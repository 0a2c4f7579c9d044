//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error taxonomy.
///
/// Every mutating operation is all-or-nothing: when a variant other than
/// `Persistence` is returned, no state change was committed. `Persistence`
/// wraps unexpected storage failures surfaced at the adapter boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (bad shape or out-of-range input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced resource does not exist (or is inactive).
    #[error("not found")]
    NotFound,

    /// A claim amount exceeds the item's remaining quantity.
    #[error("insufficient stock: {0}")]
    InsufficientStock(String),

    /// The operation lost a race or targets already-superseded state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unexpected storage failure. Not retried automatically.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn insufficient_stock(msg: impl Into<String>) -> Self {
        Self::InsufficientStock(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
}
