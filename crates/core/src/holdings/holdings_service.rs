use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;

use super::holdings_calculator::compute_holding;
use super::holdings_model::HoldingSnapshot;
use super::holdings_traits::{HoldingStoreTrait, HoldingsServiceTrait};
use crate::errors::Result;
use crate::events::{DomainEvent, DomainEventSink};
use crate::transactions::TransactionRepositoryTrait;

/// Service recomputing holding snapshots after transaction writes.
pub struct HoldingsService {
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    holding_store: Arc<dyn HoldingStoreTrait>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl HoldingsService {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        holding_store: Arc<dyn HoldingStoreTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            transaction_repository,
            holding_store,
            event_sink,
        }
    }
}

#[async_trait]
impl HoldingsServiceTrait for HoldingsService {
    async fn recompute_holding(
        &self,
        portfolio_id: &str,
        asset_id: &str,
    ) -> Result<Option<HoldingSnapshot>> {
        let transactions = self
            .transaction_repository
            .list_for_position(portfolio_id, asset_id)?;

        let Some(snapshot) = compute_holding(&transactions)? else {
            debug!(
                "No transactions for position {}/{}. Nothing to recompute.",
                portfolio_id, asset_id
            );
            return Ok(None);
        };

        let stored = self.holding_store.upsert(snapshot).await?;
        info!(
            "Holding {} recomputed: {} shares, status {:?}",
            stored.id(),
            stored.shares,
            stored.status
        );

        self.event_sink.emit(DomainEvent::holdings_changed(
            portfolio_id.to_string(),
            vec![asset_id.to_string()],
        ));

        Ok(Some(stored))
    }
}
