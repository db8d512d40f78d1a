//! Error types for the ledger service.
//!
//! Three layers, each reclassified exactly once on the way up:
//! storage adapters produce [`RepoError`], services turn the structural
//! storage signals into [`DomainError`]s and return [`AppError`], and the
//! HTTP adapter maps [`AppError`] to status codes.

use std::fmt;

/// Abstract classification of a storage constraint violation.
///
/// Adapters derive this from the driver's error kind, so services never
/// depend on engine-specific codes or constraint names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    Check,
    Other,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintKind::Unique => "unique",
            ConstraintKind::ForeignKey => "foreign key",
            ConstraintKind::NotNull => "not null",
            ConstraintKind::Check => "check",
            ConstraintKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("{kind} constraint violated: {message}")]
    Constraint {
        kind: ConstraintKind,
        constraint: Option<String>,
        message: String,
    },

    /// The query matched zero rows.
    #[error("Entity not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),
}

impl RepoError {
    /// Returns the constraint kind when this is a constraint violation.
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self {
            RepoError::Constraint { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        self.constraint_kind() == Some(ConstraintKind::Unique)
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        self.constraint_kind() == Some(ConstraintKind::ForeignKey)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound)
    }
}

/// The closed set of domain error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Referenced entity does not exist.
    NotFound,
    /// Uniqueness constraint violated.
    Duplicate,
    /// Operation type outside the enumeration or not permitted for creation.
    InvalidOperationType,
    /// Amount is not a finite, positive magnitude.
    InvalidAmount,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::Duplicate => "already exists",
            ErrorKind::InvalidOperationType => "invalid operation type",
            ErrorKind::InvalidAmount => "invalid amount",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain-level error: a kind, the entity it concerns, and an optional cause.
///
/// Callers branch on [`DomainError::kind`], never on the message.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {context}")]
pub struct DomainError {
    kind: ErrorKind,
    context: String,
    #[source]
    source: Option<RepoError>,
}

impl DomainError {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Self {
            kind,
            context: context.into(),
            source: None,
        }
    }

    /// Attaches the storage error that caused this domain error.
    pub fn caused_by(mut self, source: RepoError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn not_found(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, context)
    }

    pub fn duplicate(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Duplicate, context)
    }

    pub fn invalid_operation_type(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidOperationType, context)
    }

    pub fn invalid_amount(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidAmount, context)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn cause(&self) -> Option<&RepoError> {
        self.source.as_ref()
    }
}

/// Application-level errors returned by the services.
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Unclassified storage failure; never shown to API clients.
    #[error(transparent)]
    Storage(#[from] RepoError),

    /// The request deadline passed before the unit of work committed.
    #[error("operation cancelled: {0}")]
    Cancelled(String),
}

impl AppError {
    /// Returns the domain kind, or `None` for opaque errors.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            AppError::Domain(err) => Some(err.kind()),
            _ => None,
        }
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == Some(kind)
    }
}
