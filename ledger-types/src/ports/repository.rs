//! Repository port traits.
//!
//! These are the primary ports in our hexagonal architecture.
//! Adapters (Postgres, SQLite, in-memory test doubles) implement them.

use crate::domain::{Account, AccountCreation, AccountId, Transaction, TransactionCreation};
use crate::error::RepoError;

/// Provides storage transactions.
///
/// A `Tx` that is dropped without `commit` MUST roll back, so a cancelled or
/// panicking unit of work never leaves partial writes behind.
#[async_trait::async_trait]
pub trait TransactionScope: Send + Sync + 'static {
    /// Handle to an open storage transaction.
    type Tx: Send + 'static;

    /// Acquires a connection and opens a transaction on it.
    async fn begin(&self) -> Result<Self::Tx, RepoError>;

    /// Commits and releases the connection.
    async fn commit(&self, tx: Self::Tx) -> Result<(), RepoError>;

    /// Rolls back and releases the connection.
    async fn rollback(&self, tx: Self::Tx) -> Result<(), RepoError>;
}

/// Account persistence.
#[async_trait::async_trait]
pub trait AccountRepository: TransactionScope {
    /// Inserts an account and returns it with its storage-assigned id.
    ///
    /// A duplicate document number surfaces as a `Unique` constraint violation.
    async fn create_account(
        &self,
        tx: &mut Self::Tx,
        creation: &AccountCreation,
    ) -> Result<Account, RepoError>;

    /// Reads an account outside any explicit transaction.
    ///
    /// Zero rows surfaces as [`RepoError::NotFound`].
    async fn get_account_by_id(&self, id: AccountId) -> Result<Account, RepoError>;
}

/// Transaction persistence.
#[async_trait::async_trait]
pub trait TransactionRepository: TransactionScope {
    /// Inserts a transaction whose amount is already signed, returning the
    /// stored row with its id and event date.
    ///
    /// An `account_id` with no matching account surfaces as a `ForeignKey`
    /// constraint violation.
    async fn create_transaction(
        &self,
        tx: &mut Self::Tx,
        creation: &TransactionCreation,
    ) -> Result<Transaction, RepoError>;
}
