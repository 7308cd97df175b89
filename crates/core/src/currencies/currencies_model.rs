use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reference record for a currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRecord {
    pub id: String,
    /// ISO 4217 code, e.g. "USD"
    pub code: String,
    pub name: String,
}

impl CurrencyRecord {
    pub fn new(id: impl Into<String>, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Exact-match index from currency code to currency id.
#[derive(Debug, Clone, Default)]
pub struct CurrencyIndex {
    by_code: HashMap<String, String>,
}

impl CurrencyIndex {
    pub fn from_records(records: &[CurrencyRecord]) -> Self {
        let by_code = records
            .iter()
            .map(|record| (record.code.clone(), record.id.clone()))
            .collect();
        Self { by_code }
    }

    /// Returns the currency id for `code`. Matching is exact and case-sensitive.
    pub fn resolve(&self, code: &str) -> Option<&str> {
        self.by_code.get(code).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}
