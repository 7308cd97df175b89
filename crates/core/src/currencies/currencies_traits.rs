use super::currencies_model::CurrencyRecord;
use crate::errors::Result;

/// Trait defining the contract for the currency reference lookup.
#[async_trait::async_trait]
pub trait CurrencyLookupTrait: Send + Sync {
    /// Lists every known currency in a single round-trip.
    async fn list_currencies(&self) -> Result<Vec<CurrencyRecord>>;
}
