use serde::{Deserialize, Serialize};

/// Reference record for a tradable asset, as returned by the asset lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub id: String,
    /// Ticker code, e.g. "AAPL" or "PETR4.SA"
    pub code: String,
    pub name: Option<String>,
    pub exchange: Option<String>,
}

impl AssetRecord {
    pub fn new(id: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            ..Default::default()
        }
    }

    /// Returns true when this record answers a lookup for `code`.
    ///
    /// Lookups use prefix semantics: a file row carrying "PETR4" resolves to a
    /// record coded "PETR4.SA".
    pub fn matches_code(&self, code: &str) -> bool {
        !code.is_empty() && self.code.starts_with(code)
    }
}

/// Picks the record answering `code` out of a batched lookup response.
///
/// An exact code match wins over a prefix match; among prefix matches the
/// first record in response order is used.
pub fn find_asset_for_code<'a>(records: &'a [AssetRecord], code: &str) -> Option<&'a AssetRecord> {
    records
        .iter()
        .find(|record| record.code == code)
        .or_else(|| records.iter().find(|record| record.matches_code(code)))
}
