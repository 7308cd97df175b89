use super::assets_model::AssetRecord;
use crate::errors::Result;

/// Trait defining the contract for the asset reference lookup.
///
/// Implemented outside the core (database, market data search, ...).
#[async_trait::async_trait]
pub trait AssetLookupTrait: Send + Sync {
    /// Resolves a batch of asset codes in a single round-trip.
    ///
    /// Codes may match records exactly or by prefix. Codes without a match are
    /// simply absent from the response; an empty vector means none matched.
    async fn lookup_by_codes(&self, codes: &[String]) -> Result<Vec<AssetRecord>>;
}
