//! Reclassification of storage signals into domain errors.
//!
//! Each helper recognises exactly one structural signal and passes every
//! other storage error through unchanged.

use ledger_types::{AppError, DomainError, RepoError};

/// A unique violation becomes `Duplicate` on `context`.
pub(crate) fn unique_to_duplicate(err: RepoError, context: impl FnOnce() -> String) -> AppError {
    if err.is_unique_violation() {
        DomainError::duplicate(context()).caused_by(err).into()
    } else {
        err.into()
    }
}

/// A zero-row result becomes `NotFound` on `context`.
pub(crate) fn missing_to_not_found(err: RepoError, context: impl FnOnce() -> String) -> AppError {
    if err.is_not_found() {
        DomainError::not_found(context()).caused_by(err).into()
    } else {
        err.into()
    }
}

/// A foreign-key violation becomes `NotFound` on `context`.
pub(crate) fn dangling_to_not_found(err: RepoError, context: impl FnOnce() -> String) -> AppError {
    if err.is_foreign_key_violation() {
        DomainError::not_found(context()).caused_by(err).into()
    } else {
        err.into()
    }
}
