//! End-to-end tests: import file -> validation -> commit -> holdings.
//!
//! The import committer writes through the real `TransactionService`, which
//! recomputes holdings through the real `HoldingsService`. Persistence and
//! reference data are in-memory stand-ins.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tickerbook_core::assets::{AssetLookupTrait, AssetRecord};
use tickerbook_core::currencies::{CurrencyLookupTrait, CurrencyRecord};
use tickerbook_core::events::{DomainEvent, MockDomainEventSink};
use tickerbook_core::holdings::{HoldingSnapshot, HoldingStatus, HoldingStoreTrait, HoldingsService};
use tickerbook_core::import::{
    ImportCommitter, ImportSession, ImportSettings, ImportStep, ImportValidator, RowStatus,
    IMPORT_TRANSACTION_FAILED,
};
use tickerbook_core::transactions::{
    NewTransaction, Transaction, TransactionRepositoryTrait, TransactionService,
};
use tickerbook_core::Result;
use uuid::Uuid;

// =============================================================================
// In-memory collaborators
// =============================================================================

#[derive(Default)]
struct InMemoryTransactions {
    transactions: Mutex<Vec<Transaction>>,
}

#[async_trait]
impl TransactionRepositoryTrait for InMemoryTransactions {
    async fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        let transaction =
            Transaction::from_new(Uuid::new_v4().to_string(), new_transaction, Utc::now());
        self.transactions.lock().unwrap().push(transaction.clone());
        Ok(transaction)
    }

    fn list_for_position(&self, portfolio_id: &str, asset_id: &str) -> Result<Vec<Transaction>> {
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.portfolio_id == portfolio_id && t.asset_id == asset_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct InMemoryHoldings {
    snapshots: Mutex<HashMap<String, HoldingSnapshot>>,
}

impl InMemoryHoldings {
    fn get(&self, id: &str) -> Option<HoldingSnapshot> {
        self.snapshots.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl HoldingStoreTrait for InMemoryHoldings {
    async fn upsert(&self, snapshot: HoldingSnapshot) -> Result<HoldingSnapshot> {
        self.snapshots
            .lock()
            .unwrap()
            .insert(snapshot.id(), snapshot.clone());
        Ok(snapshot)
    }
}

struct StaticAssets(Vec<AssetRecord>);

#[async_trait]
impl AssetLookupTrait for StaticAssets {
    async fn lookup_by_codes(&self, codes: &[String]) -> Result<Vec<AssetRecord>> {
        Ok(self
            .0
            .iter()
            .filter(|r| codes.iter().any(|c| r.matches_code(c)))
            .cloned()
            .collect())
    }
}

struct StaticCurrencies(Vec<CurrencyRecord>);

#[async_trait]
impl CurrencyLookupTrait for StaticCurrencies {
    async fn list_currencies(&self) -> Result<Vec<CurrencyRecord>> {
        Ok(self.0.clone())
    }
}

struct Harness {
    holdings: Arc<InMemoryHoldings>,
    transactions: Arc<InMemoryTransactions>,
    sink: MockDomainEventSink,
    validator: ImportValidator,
    committer: ImportCommitter,
}

fn harness() -> Harness {
    let transactions = Arc::new(InMemoryTransactions::default());
    let holdings = Arc::new(InMemoryHoldings::default());
    let sink = MockDomainEventSink::new();

    let holdings_service = Arc::new(HoldingsService::new(
        transactions.clone(),
        holdings.clone(),
        Arc::new(sink.clone()),
    ));
    let transaction_service = Arc::new(TransactionService::new(
        transactions.clone(),
        holdings_service,
        Arc::new(sink.clone()),
    ));

    let validator = ImportValidator::new(
        Arc::new(StaticAssets(vec![
            AssetRecord::new("aapl", "AAPL"),
            AssetRecord::new("petr4", "PETR4.SA"),
        ])),
        Arc::new(StaticCurrencies(vec![
            CurrencyRecord::new("usd", "USD", "US Dollar"),
            CurrencyRecord::new("brl", "BRL", "Brazilian Real"),
        ])),
    );

    Harness {
        holdings,
        transactions,
        sink,
        validator,
        committer: ImportCommitter::new(transaction_service),
    }
}

fn no_delay() -> ImportSettings {
    ImportSettings {
        commit_delay_ms: 0,
        ..Default::default()
    }
}

fn selectable_tmpids(session: &ImportSession) -> Vec<String> {
    session
        .selectable_rows()
        .iter()
        .map(|row| row.tmpid.clone())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_import_builds_holdings() {
    let h = harness();
    let mut session =
        ImportSession::new("pf-main", no_delay(), Arc::new(h.sink.clone())).unwrap();

    session
        .ingest(
            b"2024-01-02;BUY;AAPL;10;100;USD\n\
              2024-01-03;BUY;AAPL;5;120;USD\n\
              2024-01-04;BUY;PETR4;100;30;BRL\n\
              2024-01-05;SELL;PETR4;40;35;BRL\n",
        )
        .unwrap();
    h.validator.validate(&mut session).await.unwrap();
    assert_eq!(session.step(), ImportStep::Review);

    let selected = selectable_tmpids(&session);
    let summary = h.committer.commit(&mut session, &selected).await.unwrap();

    assert_eq!(summary.imported, 4);
    assert_eq!(summary.failed, 0);
    assert_eq!(h.transactions.transactions.lock().unwrap().len(), 4);

    let aapl = h.holdings.get("pf-main_aapl").unwrap();
    assert_eq!(aapl.shares, dec!(15));
    assert_eq!(aapl.average_cost, dec!(1600) / dec!(15));
    assert_eq!(aapl.currency_id, "usd");

    let petr4 = h.holdings.get("pf-main_petr4").unwrap();
    assert_eq!(petr4.shares, dec!(60));
    assert_eq!(petr4.average_cost, dec!(30));
    assert_eq!(petr4.status, HoldingStatus::Active);

    let holdings_events = h
        .sink
        .events()
        .iter()
        .filter(|e| matches!(e, DomainEvent::HoldingsChanged { .. }))
        .count();
    assert_eq!(holdings_events, 4);
}

#[tokio::test]
async fn test_failed_row_does_not_stop_the_batch() {
    let h = harness();
    let mut session =
        ImportSession::new("pf-main", no_delay(), Arc::new(h.sink.clone())).unwrap();

    // The SELL comes first in file order and oversells an empty position.
    session
        .ingest(
            b"2024-01-05;SELL;AAPL;3;110;USD\n\
              2024-01-02;BUY;AAPL;10;100;USD\n\
              2024-01-03;BUY;AAPL;10;100;USD\n",
        )
        .unwrap();
    h.validator.validate(&mut session).await.unwrap();

    let selected = selectable_tmpids(&session);
    let summary = h.committer.commit(&mut session, &selected).await.unwrap();

    assert_eq!(summary.imported, 2);
    assert_eq!(summary.failed, 1);

    let rows = session.rows();
    assert_eq!(rows[0].status, RowStatus::Error);
    assert_eq!(rows[0].error.as_deref(), Some(IMPORT_TRANSACTION_FAILED));
    assert_eq!(rows[1].status, RowStatus::Done);
    assert_eq!(rows[2].status, RowStatus::Done);

    let aapl = h.holdings.get("pf-main_aapl").unwrap();
    assert_eq!(aapl.shares, dec!(20));
    assert_eq!(aapl.transactions_count, 2);
}

#[tokio::test]
async fn test_overflowing_row_fails_alone() {
    let h = harness();
    let mut session =
        ImportSession::new("pf-main", no_delay(), Arc::new(h.sink.clone())).unwrap();

    session
        .ingest(
            b"2024-01-02;BUY;AAPL;1e20;1e20;USD\n\
              2024-01-03;BUY;PETR4;100;30;BRL\n",
        )
        .unwrap();
    h.validator.validate(&mut session).await.unwrap();

    let selected = selectable_tmpids(&session);
    assert_eq!(selected.len(), 2);
    let summary = h.committer.commit(&mut session, &selected).await.unwrap();

    assert_eq!(summary.imported, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(session.step(), ImportStep::Done);

    let rows = session.rows();
    assert_eq!(rows[0].status, RowStatus::Error);
    assert_eq!(rows[0].error.as_deref(), Some(IMPORT_TRANSACTION_FAILED));
    assert_eq!(rows[1].status, RowStatus::Done);

    let stored = h.transactions.transactions.lock().unwrap().clone();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].asset_id, "petr4");
    assert!(h.holdings.get("pf-main_aapl").is_none());
    assert_eq!(h.holdings.get("pf-main_petr4").unwrap().shares, dec!(100));
}

#[tokio::test]
async fn test_liquidation_and_rebuy_through_import() {
    let h = harness();
    let mut session =
        ImportSession::new("pf-main", no_delay(), Arc::new(h.sink.clone())).unwrap();

    session
        .ingest(
            b"2024-01-01;BUY;AAPL;10;100;USD\n\
              2024-01-02;BUY;AAPL;5;120;USD\n\
              2024-01-03;SELL;AAPL;15;130;USD\n",
        )
        .unwrap();
    h.validator.validate(&mut session).await.unwrap();
    let selected = selectable_tmpids(&session);
    h.committer.commit(&mut session, &selected).await.unwrap();

    let removed = h.holdings.get("pf-main_aapl").unwrap();
    assert_eq!(removed.status, HoldingStatus::Removed);
    assert_eq!(removed.shares, Decimal::ZERO);

    // A second file in the same session after dismissing the first one.
    session.finish().unwrap();
    session.ingest(b"2024-01-04;BUY;AAPL;8;90;USD\n").unwrap();
    h.validator.validate(&mut session).await.unwrap();
    let selected = selectable_tmpids(&session);
    h.committer.commit(&mut session, &selected).await.unwrap();

    let reopened = h.holdings.get("pf-main_aapl").unwrap();
    assert_eq!(reopened.status, HoldingStatus::Active);
    assert_eq!(reopened.shares, dec!(8));
    assert_eq!(reopened.average_cost, dec!(90));
    assert_eq!(reopened.transactions_count, 4);
}
