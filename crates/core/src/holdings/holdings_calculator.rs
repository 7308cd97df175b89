//! Average-cost position accounting.
//!
//! A holding is derived by a single left-to-right fold over the complete,
//! ordered transaction history of one (portfolio, asset) pair. The fold is
//! pure: no I/O, no clock, so running it twice over the same history yields
//! identical snapshots.

use log::{debug, warn};
use rust_decimal::Decimal;

use crate::errors::{CalculatorError, Error, Result};
use crate::holdings::{HoldingSnapshot, HoldingStatus};
use crate::transactions::{sort_transactions, Transaction, TransactionType};

/// State carried between fold steps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PositionState {
    pub shares: Decimal,
    /// Shares acquired since the last full liquidation.
    pub total_shares_bought: Decimal,
    /// Amount paid for `total_shares_bought`.
    pub total_cost_bought: Decimal,
    /// `None` until the first BUY after an empty position.
    pub average_cost: Option<Decimal>,
    pub currency_id: String,
}

impl PositionState {
    pub fn new(currency_id: impl Into<String>) -> Self {
        PositionState {
            currency_id: currency_id.into(),
            ..Default::default()
        }
    }

    /// Applies one transaction to the state.
    ///
    /// A SELL of exactly the held quantity resets the state to its zero value,
    /// forgetting the cost history. A partial SELL only reduces `shares`.
    /// A SELL of more than the held quantity is rejected.
    pub fn apply(&mut self, transaction: &Transaction) -> Result<()> {
        if transaction.shares <= Decimal::ZERO {
            return Err(CalculatorError::InvalidTransaction(format!(
                "Transaction {} has non-positive shares: {}",
                transaction.id, transaction.shares
            ))
            .into());
        }
        if transaction.cost_per_share.is_sign_negative() {
            return Err(CalculatorError::InvalidTransaction(format!(
                "Transaction {} has a negative cost per share: {}",
                transaction.id, transaction.cost_per_share
            ))
            .into());
        }
        if transaction.currency_id != self.currency_id {
            warn!(
                "Transaction {} is in currency {} but position {}/{} is tracked in {}. Not reconciled.",
                transaction.id,
                transaction.currency_id,
                transaction.portfolio_id,
                transaction.asset_id,
                self.currency_id
            );
        }

        match transaction.transaction_type {
            TransactionType::Buy => self.apply_buy(transaction),
            TransactionType::Sell => self.apply_sell(transaction),
        }
    }

    fn apply_buy(&mut self, transaction: &Transaction) -> Result<()> {
        let shares = self.shares.checked_add(transaction.shares);
        let total_shares_bought = self.total_shares_bought.checked_add(transaction.shares);
        let total_cost_bought = transaction
            .amount()
            .and_then(|amount| self.total_cost_bought.checked_add(amount));

        let (Some(shares), Some(total_shares_bought), Some(total_cost_bought)) =
            (shares, total_shares_bought, total_cost_bought)
        else {
            return Err(overflow(transaction, "position totals"));
        };

        let average_cost = total_cost_bought
            .checked_div(total_shares_bought)
            .ok_or_else(|| overflow(transaction, "average cost"))?;

        self.shares = shares;
        self.total_shares_bought = total_shares_bought;
        self.total_cost_bought = total_cost_bought;
        self.average_cost = Some(average_cost);
        Ok(())
    }

    fn apply_sell(&mut self, transaction: &Transaction) -> Result<()> {
        if transaction.shares == self.shares {
            debug!(
                "Transaction {} liquidates position {}/{}. Cost history reset.",
                transaction.id, transaction.portfolio_id, transaction.asset_id
            );
            *self = PositionState::new(std::mem::take(&mut self.currency_id));
            return Ok(());
        }

        if transaction.shares > self.shares {
            return Err(CalculatorError::InsufficientShares {
                asset_id: transaction.asset_id.clone(),
                portfolio_id: transaction.portfolio_id.clone(),
                date: transaction.date,
                held: self.shares,
                sold: transaction.shares,
            }
            .into());
        }

        self.shares = self
            .shares
            .checked_sub(transaction.shares)
            .ok_or_else(|| overflow(transaction, "remaining shares"))?;
        Ok(())
    }
}

fn overflow(transaction: &Transaction, what: &str) -> Error {
    CalculatorError::Calculation(format!(
        "Overflow computing {} for transaction {} ({} shares @ {})",
        what, transaction.id, transaction.shares, transaction.cost_per_share
    ))
    .into()
}

/// Computes the holding snapshot of one (portfolio, asset) pair.
///
/// The input may be in any order; it is sorted by `(date, type)` with BUY
/// before SELL on the same date. All transactions must belong to the same
/// position. Returns `Ok(None)` for an empty history.
pub fn compute_holding(transactions: &[Transaction]) -> Result<Option<HoldingSnapshot>> {
    if transactions.is_empty() {
        return Ok(None);
    }

    let mut ordered = transactions.to_vec();
    sort_transactions(&mut ordered);

    let first = &ordered[0];
    let portfolio_id = first.portfolio_id.clone();
    let asset_id = first.asset_id.clone();

    if let Some(stray) = ordered
        .iter()
        .find(|t| t.portfolio_id != portfolio_id || t.asset_id != asset_id)
    {
        return Err(CalculatorError::MixedPositions {
            transaction_id: stray.id.clone(),
            expected: format!("{}/{}", portfolio_id, asset_id),
            found: format!("{}/{}", stray.portfolio_id, stray.asset_id),
        }
        .into());
    }

    let mut state = PositionState::new(first.currency_id.clone());
    for transaction in &ordered {
        state.apply(transaction)?;
    }

    let snapshot = if state.shares > Decimal::ZERO {
        HoldingSnapshot {
            portfolio_id,
            asset_id,
            currency_id: state.currency_id,
            shares: state.shares,
            average_cost: state.average_cost.unwrap_or(Decimal::ZERO),
            transactions_count: ordered.len(),
            status: HoldingStatus::Active,
            removed_at: None,
        }
    } else {
        // Shares only reach zero through a full liquidation, which is
        // necessarily the last transaction in order.
        HoldingSnapshot {
            portfolio_id,
            asset_id,
            currency_id: state.currency_id,
            shares: Decimal::ZERO,
            average_cost: Decimal::ZERO,
            transactions_count: ordered.len(),
            status: HoldingStatus::Removed,
            removed_at: ordered.last().map(|t| t.date),
        }
    };

    debug!(
        "Computed holding {}: {} shares @ {} ({:?}, {} transactions)",
        snapshot.id(),
        snapshot.shares,
        snapshot.average_cost,
        snapshot.status,
        snapshot.transactions_count
    );

    Ok(Some(snapshot))
}
