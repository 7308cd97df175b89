use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::transactions_constants::{TRANSACTION_TYPE_BUY, TRANSACTION_TYPE_SELL};
use crate::errors::{Result, ValidationError};

/// BUY or SELL.
///
/// The declaration order is part of the ordering key: on the same date a BUY
/// sorts before a SELL, so same-day acquisitions are absorbed into the cost
/// basis before a same-day sale reduces the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => TRANSACTION_TYPE_BUY,
            TransactionType::Sell => TRANSACTION_TYPE_SELL,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    /// Case-sensitive: only "BUY" and "SELL" are accepted.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            s if s == TRANSACTION_TYPE_BUY => Ok(TransactionType::Buy),
            s if s == TRANSACTION_TYPE_SELL => Ok(TransactionType::Sell),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

/// Domain model for a persisted transaction. Transactions are immutable facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub portfolio_id: String,
    pub asset_id: String,
    pub currency_id: String,
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    pub shares: Decimal,
    pub cost_per_share: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Builds a transaction from a write payload.
    pub fn from_new(id: impl Into<String>, new: NewTransaction, created_at: DateTime<Utc>) -> Self {
        Transaction {
            id: id.into(),
            portfolio_id: new.portfolio_id,
            asset_id: new.asset_id,
            currency_id: new.currency_id,
            date: new.date,
            transaction_type: new.transaction_type,
            shares: new.shares,
            cost_per_share: new.cost_per_share,
            created_at,
        }
    }

    /// Ordering key `(date asc, type asc)` with BUY before SELL.
    pub fn ordering_key(&self) -> (NaiveDate, TransactionType) {
        (self.date, self.transaction_type)
    }

    /// Total amount paid or received (`shares * cost_per_share`), or `None`
    /// when the product does not fit in a `Decimal`.
    pub fn amount(&self) -> Option<Decimal> {
        self.shares.checked_mul(self.cost_per_share)
    }
}

/// Sorts a transaction history by its ordering key.
///
/// The sort is stable: transactions sharing date and type keep their
/// relative input order.
pub fn sort_transactions(transactions: &mut [Transaction]) {
    transactions.sort_by_key(Transaction::ordering_key);
}

/// Payload for creating a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub portfolio_id: String,
    pub asset_id: String,
    pub currency_id: String,
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    pub shares: Decimal,
    pub cost_per_share: Decimal,
}

impl NewTransaction {
    /// Validates the payload before it reaches the repository.
    pub fn validate(&self) -> Result<()> {
        if self.portfolio_id.trim().is_empty() {
            return Err(ValidationError::MissingField("portfolio_id".to_string()).into());
        }
        if self.asset_id.trim().is_empty() {
            return Err(ValidationError::MissingField("asset_id".to_string()).into());
        }
        if self.currency_id.trim().is_empty() {
            return Err(ValidationError::MissingField("currency_id".to_string()).into());
        }
        if self.shares <= Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "Shares must be greater than zero, got {}",
                self.shares
            ))
            .into());
        }
        if self.cost_per_share.is_sign_negative() {
            return Err(ValidationError::InvalidInput(format!(
                "Cost per share must not be negative, got {}",
                self.cost_per_share
            ))
            .into());
        }
        Ok(())
    }
}
