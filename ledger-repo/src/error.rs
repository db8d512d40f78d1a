//! Driver error classification.

use ledger_types::{ConstraintKind, RepoError};
use sqlx::error::ErrorKind;

/// Maps a sqlx error onto the storage-agnostic [`RepoError`].
///
/// Constraint violations are identified by the driver's error kind (SQLSTATE
/// class for Postgres, extended result code for SQLite), never by message.
pub(crate) fn classify(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::Database(db_err) => {
            let kind = match db_err.kind() {
                ErrorKind::UniqueViolation => ConstraintKind::Unique,
                ErrorKind::ForeignKeyViolation => ConstraintKind::ForeignKey,
                ErrorKind::NotNullViolation => ConstraintKind::NotNull,
                ErrorKind::CheckViolation => ConstraintKind::Check,
                _ => return RepoError::Database(db_err.to_string()),
            };

            RepoError::Constraint {
                kind,
                constraint: db_err.constraint().map(str::to_owned),
                message: db_err.message().to_owned(),
            }
        }
        other => RepoError::Database(other.to_string()),
    }
}

/// Maps errors raised while beginning, committing or rolling back.
pub(crate) fn transaction_error(err: sqlx::Error) -> RepoError {
    RepoError::Transaction(err.to_string())
}
