use thiserror::Error;

use super::import_model::ValidationStage;

/// Session-level import failures.
///
/// Row-level problems are never reported through this type; they are
/// recorded on the row itself (`status` and `error`).
#[derive(Error, Debug)]
pub enum ImportError {
    /// The file could not be coerced into typed rows.
    #[error("Invalid import file: {message}")]
    Structure {
        /// 1-based line of the offending record, if any.
        line: Option<u64>,
        message: String,
    },

    #[error("The import file must not have more than {max_rows} transactions!")]
    Capacity { max_rows: usize },

    #[error("No assets found")]
    NoAssetsFound,

    #[error("No currencies found")]
    NoCurrenciesFound,

    /// A reference lookup failed as a whole.
    #[error("Lookup failed during {stage} stage: {message}")]
    Lookup {
        stage: ValidationStage,
        message: String,
    },

    /// An operation was called in a step that does not allow it.
    #[error("Invalid import state: {0}")]
    InvalidState(String),
}

impl ImportError {
    pub(crate) fn structure_at(line: u64, message: impl Into<String>) -> Self {
        let message = message.into();
        ImportError::Structure {
            line: Some(line),
            message: format!("line {}: {}", line, message),
        }
    }

    pub(crate) fn structure(message: impl Into<String>) -> Self {
        ImportError::Structure {
            line: None,
            message: message.into(),
        }
    }
}
