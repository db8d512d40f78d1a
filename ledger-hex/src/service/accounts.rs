use std::sync::Arc;

use tracing::Instrument;

use ledger_types::{Account, AccountCreation, AccountId, AccountRepository, AppError};

use super::scope::{in_transaction, with_deadline};
use super::translate::{missing_to_not_found, unique_to_duplicate};
use super::RequestContext;

/// Opens and looks up accounts.
pub struct AccountService<R: AccountRepository> {
    repo: Arc<R>,
}

impl<R: AccountRepository> AccountService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Persists a new account under a storage transaction.
    ///
    /// A document number that is already taken fails with `Duplicate`.
    pub async fn create_account(
        &self,
        ctx: &RequestContext,
        creation: AccountCreation,
    ) -> Result<Account, AppError> {
        async {
            tracing::info!(document_number = %creation.document_number, "creating account");

            let repo = Arc::clone(&self.repo);
            let result = in_transaction(self.repo.as_ref(), ctx, move |tx| {
                Box::pin(async move {
                    repo.create_account(tx, &creation).await.map_err(|err| {
                        unique_to_duplicate(err, || {
                            format!("document number {}", creation.document_number)
                        })
                    })
                })
            })
            .await;

            match &result {
                Ok(account) => tracing::info!(account_id = %account.id, "account created"),
                Err(err) => tracing::warn!(error = %err, "account creation failed"),
            }
            result
        }
        .instrument(ctx.span("create_account"))
        .await
    }

    /// Reads one account. An unknown id fails with `NotFound`.
    pub async fn get_account_by_id(
        &self,
        ctx: &RequestContext,
        id: AccountId,
    ) -> Result<Account, AppError> {
        async {
            tracing::debug!(account_id = %id, "fetching account");

            let result = with_deadline(ctx.deadline(), async {
                self.repo
                    .get_account_by_id(id)
                    .await
                    .map_err(|err| missing_to_not_found(err, || format!("account {id}")))
            })
            .await;

            match &result {
                Ok(account) => tracing::debug!(account_id = %account.id, "account found"),
                Err(err) => tracing::warn!(account_id = %id, error = %err, "account lookup failed"),
            }
            result
        }
        .instrument(ctx.span("get_account_by_id"))
        .await
    }
}
