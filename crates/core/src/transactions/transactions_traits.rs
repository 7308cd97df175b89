use async_trait::async_trait;

use super::transactions_model::{NewTransaction, Transaction};
use crate::errors::Result;

/// Trait defining the contract for Transaction repository operations.
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    /// Persists a new transaction and returns the stored record.
    async fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;

    /// Returns the complete history of one (portfolio, asset) pair.
    /// No ordering is guaranteed; callers sort by the ordering key.
    fn list_for_position(&self, portfolio_id: &str, asset_id: &str) -> Result<Vec<Transaction>>;
}

/// The single write operation the import committer calls per row.
#[async_trait]
pub trait TransactionWriterTrait: Send + Sync {
    async fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;
}
