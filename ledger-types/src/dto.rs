//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Account, AccountId, Transaction, TransactionId};

// ─────────────────────────────────────────────────────────────────────────────
// Account DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a new account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAccountRequest {
    /// Document number of the account holder
    #[schema(example = "12345678900", min_length = 1)]
    pub document_number: String,
}

/// Account representation returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    #[schema(value_type = i64, example = 1)]
    pub account_id: AccountId,
    #[schema(example = "12345678900")]
    pub document_number: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.id,
            document_number: account.document_number,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transaction DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to post a transaction against an account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    /// Target account ID
    #[schema(example = 1, minimum = 1)]
    pub account_id: i64,
    /// 1 = purchase, 2 = installment purchase, 3 = withdrawal, 4 = payment
    #[schema(example = 4, minimum = 1, maximum = 4)]
    pub operation_type_id: i64,
    /// Unsigned amount; the sign is derived from the operation type
    #[schema(example = 123.45, exclusive_minimum = 0)]
    pub amount: f64,
}

/// Transaction representation returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    #[schema(value_type = i64, example = 1)]
    pub transaction_id: TransactionId,
    #[schema(value_type = i64, example = 1)]
    pub account_id: AccountId,
    #[schema(example = 1)]
    pub operation_type_id: i64,
    /// Signed amount as persisted
    pub amount: f64,
    pub event_date: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            transaction_id: tx.id,
            account_id: tx.account_id,
            operation_type_id: tx.operation_type.id(),
            amount: tx.amount,
            event_date: tx.event_date,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Body returned for classified errors.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Stable machine-readable code
    #[schema(example = "notFound")]
    pub code: String,
    #[schema(example = "not found: account 9999")]
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
