//! Database row types and their conversion into domain models.

use sqlx::FromRow;

use ledger_types::{Account, AccountId, OperationType, RepoError, Transaction, TransactionId};

/// Account row from database.
#[derive(FromRow)]
pub struct DbAccount {
    pub id: i64,
    pub document_number: String,
}

impl DbAccount {
    pub fn into_domain(self) -> Account {
        Account::from_parts(AccountId::new(self.id), self.document_number)
    }
}

/// Transaction row from PostgreSQL.
#[cfg(feature = "postgres")]
#[derive(FromRow)]
pub struct DbTransaction {
    pub id: i64,
    pub account_id: i64,
    pub operation_type: String,
    pub amount: f64,
    pub event_date: chrono::DateTime<chrono::Utc>,
}

#[cfg(feature = "postgres")]
impl DbTransaction {
    pub fn into_domain(self) -> Transaction {
        Transaction::from_parts(
            TransactionId::new(self.id),
            AccountId::new(self.account_id),
            OperationType::from_name(&self.operation_type),
            self.amount,
            self.event_date,
        )
    }
}

/// Transaction row from SQLite, where timestamps are stored as RFC 3339 text.
#[cfg(feature = "sqlite")]
#[derive(FromRow)]
pub struct DbSqliteTransaction {
    pub id: i64,
    pub account_id: i64,
    pub operation_type: String,
    pub amount: f64,
    pub event_date: String,
}

#[cfg(feature = "sqlite")]
impl DbSqliteTransaction {
    pub fn into_domain(self) -> Result<Transaction, RepoError> {
        let event_date = chrono::DateTime::parse_from_rfc3339(&self.event_date)
            .map_err(|e| RepoError::Database(format!("invalid event_date {:?}: {}", self.event_date, e)))?
            .with_timezone(&chrono::Utc);

        Ok(Transaction::from_parts(
            TransactionId::new(self.id),
            AccountId::new(self.account_id),
            OperationType::from_name(&self.operation_type),
            self.amount,
            event_date,
        ))
    }
}
