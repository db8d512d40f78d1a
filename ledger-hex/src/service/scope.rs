//! Scoped unit of work over a [`TransactionScope`].

use std::future::Future;
use std::pin::Pin;

use tokio::time::Instant;

use ledger_types::{AppError, TransactionScope};

use super::RequestContext;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Awaits `fut`, failing with [`AppError::Cancelled`] once `deadline` passes.
pub async fn with_deadline<F, T>(deadline: Option<Instant>, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, fut)
            .await
            .map_err(|_| AppError::Cancelled("request deadline exceeded".into()))?,
        None => fut.await,
    }
}

/// Runs `work` inside a fresh storage transaction.
///
/// Commits when `work` returns `Ok`. Rolls back when it returns `Err` or the
/// context deadline passes first. If the returned future is dropped midway,
/// the open `Tx` is dropped with it and the adapter rolls it back.
pub async fn in_transaction<S, T, F>(
    scope: &S,
    ctx: &RequestContext,
    work: F,
) -> Result<T, AppError>
where
    S: TransactionScope + ?Sized,
    T: Send,
    F: for<'c> FnOnce(&'c mut S::Tx) -> BoxFuture<'c, Result<T, AppError>> + Send,
{
    let deadline = ctx.deadline();
    let mut tx = with_deadline(deadline, async { scope.begin().await.map_err(AppError::from) }).await?;

    match with_deadline(deadline, work(&mut tx)).await {
        Ok(value) => {
            scope.commit(tx).await?;
            tracing::debug!("transaction committed");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = scope.rollback(tx).await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            tracing::debug!(error = %err, "transaction rolled back");
            Err(err)
        }
    }
}
