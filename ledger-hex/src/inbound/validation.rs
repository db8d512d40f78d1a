//! Request validation, performed before any service call.

use ledger_types::{
    AccountCreation, AccountId, CreateAccountRequest, CreateTransactionRequest, OperationType,
    TransactionCreation,
};

/// Checks a request body and converts it into the service input.
pub(crate) trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output, String>;
}

impl Validate for CreateAccountRequest {
    type Output = AccountCreation;

    fn validate(self) -> Result<AccountCreation, String> {
        if self.document_number.trim().is_empty() {
            return Err("document_number must not be empty".into());
        }
        Ok(AccountCreation::new(self.document_number))
    }
}

impl Validate for CreateTransactionRequest {
    type Output = TransactionCreation;

    fn validate(self) -> Result<TransactionCreation, String> {
        if self.account_id < 1 {
            return Err("account_id must be a positive integer".into());
        }
        if !(1..=4).contains(&self.operation_type_id) {
            return Err("operation_type_id must be between 1 and 4".into());
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err("amount must be a positive number".into());
        }
        Ok(TransactionCreation::new(
            AccountId::new(self.account_id),
            OperationType::from_id(self.operation_type_id),
            self.amount,
        ))
    }
}

/// Parses the `{account_id}` path segment.
pub(crate) fn parse_account_id(raw: &str) -> Result<AccountId, String> {
    raw.parse()
        .map_err(|_| format!("account_id must be an integer, got {raw:?}"))
}
