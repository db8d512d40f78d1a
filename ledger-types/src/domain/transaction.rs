//! Transaction domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::account::AccountId;

/// Storage-assigned identifier for a Transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TransactionId(i64);

impl TransactionId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying integer value.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for TransactionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a transaction's amount sign is resolved.
///
/// `Unknown` is the decode fallback for unrecognised values and is never
/// accepted for creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OperationType {
    #[default]
    Unknown,
    Purchase,
    InstallmentPurchase,
    Withdrawal,
    Payment,
}

impl OperationType {
    /// All operation types that may be used to create a transaction.
    pub const CREATABLE: [OperationType; 4] = [
        OperationType::Purchase,
        OperationType::InstallmentPurchase,
        OperationType::Withdrawal,
        OperationType::Payment,
    ];

    /// Decodes the wire id; anything outside 1..=4 becomes `Unknown`.
    pub fn from_id(id: i64) -> Self {
        match id {
            1 => OperationType::Purchase,
            2 => OperationType::InstallmentPurchase,
            3 => OperationType::Withdrawal,
            4 => OperationType::Payment,
            _ => OperationType::Unknown,
        }
    }

    /// Decodes the stored name (case-insensitive); unknown names become `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "purchase" => OperationType::Purchase,
            "installment_purchase" => OperationType::InstallmentPurchase,
            "withdrawal" => OperationType::Withdrawal,
            "payment" => OperationType::Payment,
            _ => OperationType::Unknown,
        }
    }

    /// The wire id.
    pub fn id(&self) -> i64 {
        match self {
            OperationType::Unknown => 0,
            OperationType::Purchase => 1,
            OperationType::InstallmentPurchase => 2,
            OperationType::Withdrawal => 3,
            OperationType::Payment => 4,
        }
    }

    /// The stored name. Empty for `Unknown`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Unknown => "",
            OperationType::Purchase => "purchase",
            OperationType::InstallmentPurchase => "installment_purchase",
            OperationType::Withdrawal => "withdrawal",
            OperationType::Payment => "payment",
        }
    }

    /// Sign applied to the amount: debits are negative, payments positive.
    /// `None` when the type has no policy.
    pub fn sign(&self) -> Option<f64> {
        match self {
            OperationType::Purchase
            | OperationType::InstallmentPurchase
            | OperationType::Withdrawal => Some(-1.0),
            OperationType::Payment => Some(1.0),
            OperationType::Unknown => None,
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationType::Unknown => f.write_str("unknown"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Input for posting a transaction against an account.
///
/// The service receives the unsigned magnitude; the repository receives the
/// same shape with the policy sign already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionCreation {
    pub account_id: AccountId,
    pub operation_type: OperationType,
    pub amount: f64,
}

impl TransactionCreation {
    pub fn new(account_id: AccountId, operation_type: OperationType, amount: f64) -> Self {
        Self {
            account_id,
            operation_type,
            amount,
        }
    }
}

/// A recorded ledger transaction.
///
/// Transactions are immutable once created - they represent
/// a historical record of what happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    #[serde(with = "operation_type_id")]
    pub operation_type: OperationType,
    /// Signed amount as persisted
    pub amount: f64,
    /// Assigned by storage at insert time
    pub event_date: DateTime<Utc>,
}

impl Transaction {
    /// Reconstructs a transaction from stored fields.
    pub fn from_parts(
        id: TransactionId,
        account_id: AccountId,
        operation_type: OperationType,
        amount: f64,
        event_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            account_id,
            operation_type,
            amount,
            event_date,
        }
    }
}

mod operation_type_id {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::OperationType;

    pub fn serialize<S: Serializer>(op: &OperationType, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(op.id())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<OperationType, D::Error> {
        Ok(OperationType::from_id(i64::deserialize(d)?))
    }
}
