//! PostgreSQL repository adapter.

use async_trait::async_trait;
use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{PgPool, Postgres};

use ledger_types::{
    Account, AccountCreation, AccountId, AccountRepository, RepoError, Transaction,
    TransactionCreation, TransactionRepository, TransactionScope,
};

use crate::PostgresParts;
use crate::error::{classify, transaction_error};
use crate::types::{DbAccount, DbTransaction};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_tables_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresParts {
    /// Connection options built field by field, so credentials need no escaping.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(PgSslMode::Disable)
    }
}

impl PostgresRepo {
    /// Connects a pool to `database_url` and runs migrations.
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        Self::connect(PgConnectOptions::from_str(database_url)?, max_connections).await
    }

    /// Connects a pool from discrete connection parts and runs migrations.
    pub async fn from_parts(parts: &PostgresParts, max_connections: u32) -> anyhow::Result<Self> {
        Self::connect(parts.connect_options(), max_connections).await
    }

    async fn connect(options: PgConnectOptions, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        run_migrations(&pool).await?;
        tracing::debug!(max_connections, "postgres pool ready");
        Ok(Self { pool })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Port implementations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl TransactionScope for PostgresRepo {
    type Tx = sqlx::Transaction<'static, Postgres>;

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
impl AccountRepository for PostgresRepo {
    async fn create_account(
        &self,
        tx: &mut Self::Tx,
        creation: &AccountCreation,
    ) -> Result<Account, RepoError> {
        let row: DbAccount = sqlx::query_as(
            r#"INSERT INTO accounts (document_number) VALUES ($1) RETURNING id, document_number"#,
        )
        .bind(&creation.document_number)
        .fetch_one(&mut **tx)
        .await
        .map_err(classify)?;

        Ok(row.into_domain())
    }

    async fn get_account_by_id(&self, id: AccountId) -> Result<Account, RepoError> {
        let row: Option<DbAccount> =
            sqlx::query_as(r#"SELECT id, document_number FROM accounts WHERE id = $1"#)
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(classify)?;

        row.map(DbAccount::into_domain).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl TransactionRepository for PostgresRepo {
    async fn create_transaction(
        &self,
        tx: &mut Self::Tx,
        creation: &TransactionCreation,
    ) -> Result<Transaction, RepoError> {
        let row: DbTransaction = sqlx::query_as(
            r#"INSERT INTO transactions (account_id, operation_type, amount) VALUES ($1, $2, $3)
               RETURNING id, account_id, operation_type, amount::DOUBLE PRECISION AS amount, event_date"#,
        )
        .bind(creation.account_id.get())
        .bind(creation.operation_type.as_str())
        .bind(creation.amount)
        .fetch_one(&mut **tx)
        .await
        .map_err(classify)?;

        Ok(row.into_domain())
    }
}
