use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::constants::{AVERAGE_COST_DISPLAY_PRECISION, DISPLAY_DECIMAL_PRECISION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HoldingStatus {
    /// The position holds shares.
    Active,
    /// The position was fully liquidated.
    Removed,
}

/// Derived state of one (portfolio, asset) position.
///
/// Always recomputed from the complete transaction history and replaced
/// wholesale in the holding store; never patched incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingSnapshot {
    pub portfolio_id: String,
    pub asset_id: String,
    pub currency_id: String,
    pub shares: Decimal,
    /// Weighted average cost per share; zero when the position is removed.
    pub average_cost: Decimal,
    pub transactions_count: usize,
    pub status: HoldingStatus,
    /// Date of the sale that liquidated the position.
    pub removed_at: Option<NaiveDate>,
}

impl HoldingSnapshot {
    /// Store key: `{portfolio_id}_{asset_id}`.
    pub fn id(&self) -> String {
        format!("{}_{}", self.portfolio_id, self.asset_id)
    }

    pub fn is_active(&self) -> bool {
        self.status == HoldingStatus::Active
    }

    /// Book cost of the remaining shares.
    pub fn cost_basis(&self) -> Decimal {
        (self.shares * self.average_cost)
            .round_dp_with_strategy(DISPLAY_DECIMAL_PRECISION, RoundingStrategy::MidpointNearestEven)
    }

    /// Average cost rounded for presentation. Calculations use `average_cost`.
    pub fn display_average_cost(&self) -> Decimal {
        self.average_cost.round_dp_with_strategy(
            AVERAGE_COST_DISPLAY_PRECISION,
            RoundingStrategy::MidpointNearestEven,
        )
    }
}
