//! Domain models for the ledger service.

pub mod account;
pub mod transaction;

pub use account::{Account, AccountCreation, AccountId};
pub use transaction::{OperationType, Transaction, TransactionCreation, TransactionId};
