use std::sync::Arc;

use tracing::Instrument;

use ledger_types::{
    AppError, DomainError, OperationType, Transaction, TransactionCreation, TransactionRepository,
};

use super::scope::in_transaction;
use super::translate::dangling_to_not_found;
use super::RequestContext;

/// Posts signed transactions against existing accounts.
pub struct TransactionService<R: TransactionRepository> {
    repo: Arc<R>,
}

impl<R: TransactionRepository> TransactionService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Applies the sign policy to `creation.amount` and persists the result.
    ///
    /// Policy failures return before a storage transaction is opened. An
    /// account id with no account behind it fails with `NotFound`.
    pub async fn create_transaction(
        &self,
        ctx: &RequestContext,
        creation: TransactionCreation,
    ) -> Result<Transaction, AppError> {
        async {
            tracing::info!(
                account_id = %creation.account_id,
                operation_type = %creation.operation_type,
                "creating transaction"
            );

            let amount = match resolve_signed_amount(creation.operation_type, creation.amount) {
                Ok(amount) => amount,
                Err(err) => {
                    tracing::warn!(error = %err, "transaction rejected by policy");
                    return Err(AppError::from(err));
                }
            };
            let signed = TransactionCreation { amount, ..creation };

            let repo = Arc::clone(&self.repo);
            let result = in_transaction(self.repo.as_ref(), ctx, move |tx| {
                Box::pin(async move {
                    repo.create_transaction(tx, &signed).await.map_err(|err| {
                        dangling_to_not_found(err, || format!("account {}", signed.account_id))
                    })
                })
            })
            .await;

            match &result {
                Ok(created) => tracing::info!(
                    transaction_id = %created.id,
                    amount = created.amount,
                    "transaction created"
                ),
                Err(err) => tracing::warn!(error = %err, "transaction creation failed"),
            }
            result
        }
        .instrument(ctx.span("create_transaction"))
        .await
    }
}

/// Resolves the signed amount for `operation_type`.
///
/// The operation type is checked first, then the magnitude, which must be
/// finite and strictly positive.
pub fn resolve_signed_amount(
    operation_type: OperationType,
    amount: f64,
) -> Result<f64, DomainError> {
    let sign = operation_type.sign().ok_or_else(|| {
        DomainError::invalid_operation_type(format!("operation type {operation_type}"))
    })?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(DomainError::invalid_amount(format!("amount {amount}")));
    }

    Ok(sign * amount)
}

#[cfg(test)]
mod tests {
    use ledger_types::ErrorKind;

    use super::*;

    #[test]
    fn test_debits_are_negative() {
        for op in [
            OperationType::Purchase,
            OperationType::InstallmentPurchase,
            OperationType::Withdrawal,
        ] {
            assert_eq!(resolve_signed_amount(op, 50.0).unwrap(), -50.0);
        }
    }

    #[test]
    fn test_payment_is_positive() {
        assert_eq!(resolve_signed_amount(OperationType::Payment, 60.0).unwrap(), 60.0);
    }

    #[test]
    fn test_unknown_operation_type_is_rejected() {
        let err = resolve_signed_amount(OperationType::Unknown, 10.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperationType);
    }

    #[test]
    fn test_operation_type_checked_before_amount() {
        let err = resolve_signed_amount(OperationType::Unknown, -1.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperationType);
    }

    #[test]
    fn test_non_positive_or_non_finite_amount_is_rejected() {
        for amount in [0.0, -0.0, -5.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = resolve_signed_amount(OperationType::Purchase, amount).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidAmount, "amount {amount}");
        }
    }
}
