use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::import_constants::{DEFAULT_COMMIT_DELAY_MS, DEFAULT_IMPORT_DELIMITER, IMPORT_LIST_LIMIT};
use crate::errors::{Error, Result};

/// Tunables of the import pipeline.
///
/// Every field has a default, so a partial JSON document is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportSettings {
    /// Single-byte field delimiter.
    pub delimiter: char,
    /// Files with more rows are rejected.
    pub max_rows: usize,
    /// Pause between two consecutive row commits.
    pub commit_delay_ms: u64,
    /// Per-row deadline for the transaction write. `None` waits indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_timeout_ms: Option<u64>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_IMPORT_DELIMITER,
            max_rows: IMPORT_LIST_LIMIT,
            commit_delay_ms: DEFAULT_COMMIT_DELAY_MS,
            commit_timeout_ms: None,
        }
    }
}

impl ImportSettings {
    /// Parses settings from JSON and validates them.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: ImportSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let printable = self.delimiter.is_ascii_graphic() || self.delimiter == '\t';
        if !printable || self.delimiter == '"' {
            return Err(Error::InvalidConfigValue(format!(
                "delimiter must be a printable ASCII character or a tab, got {:?}",
                self.delimiter
            )));
        }
        if self.max_rows == 0 {
            return Err(Error::InvalidConfigValue(
                "maxRows must be greater than zero".to_string(),
            ));
        }
        if self.commit_timeout_ms == Some(0) {
            return Err(Error::InvalidConfigValue(
                "commitTimeoutMs must be greater than zero when set".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn delimiter_byte(&self) -> u8 {
        // validate() guarantees an ASCII delimiter
        self.delimiter as u8
    }

    pub fn commit_delay(&self) -> Duration {
        Duration::from_millis(self.commit_delay_ms)
    }

    pub fn commit_timeout(&self) -> Option<Duration> {
        self.commit_timeout_ms.map(Duration::from_millis)
    }
}
