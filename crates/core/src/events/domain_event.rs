//! Domain event types.

use serde::{Deserialize, Serialize};

use crate::import::{ImportCandidateRow, ImportStep, StageStatus, ValidationStage};

/// Domain events emitted by core services after successful mutations.
///
/// Transaction and holding events describe persisted facts. Import events
/// describe transitions of a transient import session so a UI can render
/// live per-stage and per-row progress.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A transaction was written for the given position.
    TransactionsChanged {
        portfolio_id: String,
        asset_ids: Vec<String>,
    },

    /// Holding snapshots were recomputed and stored.
    HoldingsChanged {
        portfolio_id: String,
        asset_ids: Vec<String>,
    },

    /// A validation stage of an import session changed status.
    ImportStageChanged {
        session_id: String,
        stage: ValidationStage,
        status: StageStatus,
    },

    /// Rows of an import session were replaced with an updated copy.
    ImportRowsChanged {
        session_id: String,
        /// New state of every row that changed, with its status and error.
        rows: Vec<ImportCandidateRow>,
    },

    /// All rows of an import session were discarded.
    ImportRowsCleared { session_id: String },

    /// The import session moved to another step.
    ImportStepChanged { session_id: String, step: ImportStep },
}

impl DomainEvent {
    /// Creates a TransactionsChanged event.
    pub fn transactions_changed(portfolio_id: String, asset_ids: Vec<String>) -> Self {
        Self::TransactionsChanged {
            portfolio_id,
            asset_ids,
        }
    }

    /// Creates a HoldingsChanged event.
    pub fn holdings_changed(portfolio_id: String, asset_ids: Vec<String>) -> Self {
        Self::HoldingsChanged {
            portfolio_id,
            asset_ids,
        }
    }

    pub fn import_stage_changed(
        session_id: String,
        stage: ValidationStage,
        status: StageStatus,
    ) -> Self {
        Self::ImportStageChanged {
            session_id,
            stage,
            status,
        }
    }

    pub fn import_rows_changed(session_id: String, rows: Vec<ImportCandidateRow>) -> Self {
        Self::ImportRowsChanged { session_id, rows }
    }

    pub fn import_rows_cleared(session_id: String) -> Self {
        Self::ImportRowsCleared { session_id }
    }

    pub fn import_step_changed(session_id: String, step: ImportStep) -> Self {
        Self::ImportStepChanged { session_id, step }
    }
}
