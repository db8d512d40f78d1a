//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};
use std::path::Path;
use std::str::FromStr;

use ledger_types::{
    Account, AccountCreation, AccountId, AccountRepository, RepoError, Transaction,
    TransactionCreation, TransactionRepository, TransactionScope,
};

use crate::error::{classify, transaction_error};
use crate::types::{DbAccount, DbSqliteTransaction};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// The on-disk file a SQLite URL points at, if any.
fn database_path(database_url: &str) -> Option<&Path> {
    if is_in_memory(database_url) {
        return None;
    }
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    // Remove query parameters
    let path = rest.split('?').next().unwrap_or(rest);
    (!path.is_empty()).then(|| Path::new(path))
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    ///
    /// In-memory databases live only as long as their connection, so they are
    /// pinned to a single connection that is never recycled.
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(parent) = database_path(database_url).and_then(Path::parent) {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            options = options.journal_mode(SqliteJournalMode::Wal);
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options.connect_with(options).await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        tracing::debug!(database_url, "sqlite pool ready");

        Ok(repo)
    }

    /// Opens a private in-memory database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        Self::new("sqlite::memory:", 1).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies the embedded schema migration.
    async fn create_schema(&self) -> Result<(), RepoError> {
        let ddl = include_str!("../migrations/0001_create_tables.sql");
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Port implementations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl TransactionScope for SqliteRepo {
    type Tx = sqlx::Transaction<'static, Sqlite>;

    async fn begin(&self) -> Result<Self::Tx, RepoError> {
        self.pool.begin().await.map_err(transaction_error)
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), RepoError> {
        tx.commit().await.map_err(transaction_error)
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), RepoError> {
        tx.rollback().await.map_err(transaction_error)
    }
}

#[async_trait]
impl AccountRepository for SqliteRepo {
    async fn create_account(
        &self,
        tx: &mut Self::Tx,
        creation: &AccountCreation,
    ) -> Result<Account, RepoError> {
        let row: DbAccount = sqlx::query_as(
            r#"INSERT INTO accounts (document_number) VALUES (?) RETURNING id, document_number"#,
        )
        .bind(&creation.document_number)
        .fetch_one(&mut **tx)
        .await
        .map_err(classify)?;

        Ok(row.into_domain())
    }

    async fn get_account_by_id(&self, id: AccountId) -> Result<Account, RepoError> {
        let row: Option<DbAccount> =
            sqlx::query_as(r#"SELECT id, document_number FROM accounts WHERE id = ?"#)
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(classify)?;

        row.map(DbAccount::into_domain).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl TransactionRepository for SqliteRepo {
    async fn create_transaction(
        &self,
        tx: &mut Self::Tx,
        creation: &TransactionCreation,
    ) -> Result<Transaction, RepoError> {
        let row: DbSqliteTransaction = sqlx::query_as(
            r#"INSERT INTO transactions (account_id, operation_type, amount) VALUES (?, ?, ?)
               RETURNING id, account_id, operation_type, amount, event_date"#,
        )
        .bind(creation.account_id.get())
        .bind(creation.operation_type.as_str())
        .bind(creation.amount)
        .fetch_one(&mut **tx)
        .await
        .map_err(classify)?;

        row.into_domain()
    }
}
