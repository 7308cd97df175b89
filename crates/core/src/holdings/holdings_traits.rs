use async_trait::async_trait;

use super::holdings_model::HoldingSnapshot;
use crate::errors::Result;

/// Trait defining the contract for the holding store.
///
/// The store keeps one snapshot per (portfolio, asset) pair; the last
/// upsert wins.
#[async_trait]
pub trait HoldingStoreTrait: Send + Sync {
    async fn upsert(&self, snapshot: HoldingSnapshot) -> Result<HoldingSnapshot>;
}

/// Trait defining the contract for holdings service operations.
#[async_trait]
pub trait HoldingsServiceTrait: Send + Sync {
    /// Recomputes the snapshot of one position from its full history and
    /// stores it. Returns `None` when the position has no transactions.
    async fn recompute_holding(
        &self,
        portfolio_id: &str,
        asset_id: &str,
    ) -> Result<Option<HoldingSnapshot>>;
}
