//! # Ledger Types
//!
//! Domain types and port traits for the ledger service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Account, Transaction, OperationType)
//! - `ports/` - Trait definitions that storage adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Storage, domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Account, AccountCreation, AccountId, OperationType, Transaction, TransactionCreation,
    TransactionId,
};
pub use dto::*;
pub use error::{AppError, ConstraintKind, DomainError, ErrorKind, RepoError};
pub use ports::{AccountRepository, TransactionRepository, TransactionScope};
