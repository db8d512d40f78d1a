//! Account domain model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Storage-assigned identifier for an Account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying integer value.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for AccountId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AccountId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Input for opening a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCreation {
    pub document_number: String,
}

impl AccountCreation {
    pub fn new(document_number: impl Into<String>) -> Self {
        Self {
            document_number: document_number.into(),
        }
    }
}

/// A ledger account, identified by its holder's document number.
///
/// Accounts are never mutated or deleted once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Unique across all accounts
    pub document_number: String,
}

impl Account {
    /// Reconstructs an account from stored fields.
    pub fn from_parts(id: AccountId, document_number: String) -> Self {
        Self {
            id,
            document_number,
        }
    }
}
