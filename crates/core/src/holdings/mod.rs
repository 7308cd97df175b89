//! Holdings module - position accounting, holding snapshots and the store.

pub mod holdings_calculator;
mod holdings_model;
mod holdings_service;
mod holdings_traits;

pub use holdings_calculator::{compute_holding, PositionState};
pub use holdings_model::{HoldingSnapshot, HoldingStatus};
pub use holdings_service::HoldingsService;
pub use holdings_traits::{HoldingStoreTrait, HoldingsServiceTrait};

#[cfg(test)]
mod holdings_calculator_tests;
