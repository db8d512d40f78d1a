//! Application services.
//!
//! Services are generic over the repository ports so adapters can be
//! swapped at compile time. Every call takes a [`RequestContext`] carrying
//! the correlation id and an optional deadline.

mod accounts;
mod context;
mod scope;
mod transactions;
mod translate;

pub use accounts::AccountService;
pub use context::RequestContext;
pub use scope::{BoxFuture, in_transaction, with_deadline};
pub use transactions::{TransactionService, resolve_signed_amount};

use ledger_types::{AccountRepository, TransactionRepository};

/// A store that backs both services.
pub trait LedgerRepository: AccountRepository + TransactionRepository {}

impl<T> LedgerRepository for T where T: AccountRepository + TransactionRepository {}
