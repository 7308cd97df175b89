use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error, info};
use std::sync::Arc;

use super::transactions_model::{NewTransaction, Transaction};
use super::transactions_traits::{TransactionRepositoryTrait, TransactionWriterTrait};
use crate::errors::Result;
use crate::events::{DomainEvent, DomainEventSink};
use crate::holdings::{compute_holding, HoldingsServiceTrait};

/// Service for writing transactions.
///
/// Every successful write triggers a recompute of the affected holding.
pub struct TransactionService {
    repository: Arc<dyn TransactionRepositoryTrait>,
    holdings_service: Arc<dyn HoldingsServiceTrait>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl TransactionService {
    /// Creates a new TransactionService instance with injected dependencies
    pub fn new(
        repository: Arc<dyn TransactionRepositoryTrait>,
        holdings_service: Arc<dyn HoldingsServiceTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            repository,
            holdings_service,
            event_sink,
        }
    }

    /// Replays the position history with the pending transaction appended so
    /// an oversell or an arithmetic overflow is rejected before anything is
    /// written.
    fn check_against_history(&self, new_transaction: &NewTransaction) -> Result<()> {
        let mut history = self
            .repository
            .list_for_position(&new_transaction.portfolio_id, &new_transaction.asset_id)?;
        history.push(Transaction::from_new(
            "pending",
            new_transaction.clone(),
            Utc::now(),
        ));
        compute_holding(&history)?;
        Ok(())
    }
}

#[async_trait]
impl TransactionWriterTrait for TransactionService {
    async fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        new_transaction.validate()?;

        self.check_against_history(&new_transaction)?;

        let created = self.repository.create_transaction(new_transaction).await?;
        debug!(
            "Created {} transaction {} for {}/{}",
            created.transaction_type, created.id, created.portfolio_id, created.asset_id
        );

        self.event_sink.emit(DomainEvent::transactions_changed(
            created.portfolio_id.clone(),
            vec![created.asset_id.clone()],
        ));

        // The write is committed at this point; a failed recompute leaves the
        // previous snapshot in place until the next write for the position.
        match self
            .holdings_service
            .recompute_holding(&created.portfolio_id, &created.asset_id)
            .await
        {
            Ok(Some(snapshot)) => info!(
                "Holding {} now at {} shares",
                snapshot.id(),
                snapshot.shares
            ),
            Ok(None) => {}
            Err(e) => error!(
                "Failed to recompute holding {}/{} after transaction {}: {}",
                created.portfolio_id, created.asset_id, created.id, e
            ),
        }

        Ok(created)
    }
}
