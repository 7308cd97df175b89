use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::assets::AssetRecord;
use crate::transactions::{NewTransaction, TransactionType};

/// Lifecycle of one candidate row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Validating,
    Error,
    Importing,
    Done,
}

/// Validation stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStage {
    Structure,
    Assets,
    Transactions,
    Currencies,
}

impl ValidationStage {
    pub const ALL: [ValidationStage; 4] = [
        ValidationStage::Structure,
        ValidationStage::Assets,
        ValidationStage::Transactions,
        ValidationStage::Currencies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStage::Structure => "structure",
            ValidationStage::Assets => "assets",
            ValidationStage::Transactions => "transactions",
            ValidationStage::Currencies => "currencies",
        }
    }
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    #[default]
    Pending,
    InProgress,
    Success,
    Error,
}

/// Per-stage status map. Stages never set read as `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationStageStatus {
    stages: BTreeMap<ValidationStage, StageStatus>,
}

impl ValidationStageStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stage: ValidationStage) -> StageStatus {
        self.stages.get(&stage).copied().unwrap_or_default()
    }

    pub fn set(&mut self, stage: ValidationStage, status: StageStatus) {
        self.stages.insert(stage, status);
    }

    pub fn is_success(&self, stage: ValidationStage) -> bool {
        self.get(stage) == StageStatus::Success
    }

    /// First stage in error, if any.
    pub fn failed_stage(&self) -> Option<ValidationStage> {
        ValidationStage::ALL
            .into_iter()
            .find(|stage| self.get(*stage) == StageStatus::Error)
    }

    /// All stages in execution order, including unset ones.
    pub fn iter(&self) -> impl Iterator<Item = (ValidationStage, StageStatus)> + '_ {
        ValidationStage::ALL
            .into_iter()
            .map(move |stage| (stage, self.get(stage)))
    }

    pub fn clear(&mut self) {
        self.stages.clear();
    }
}

/// Overall step of an import session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStep {
    #[default]
    Validation,
    Review,
    Importing,
    Done,
}

/// One parsed line of an import file together with its validation outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportCandidateRow {
    /// Session-unique id assigned at parse time.
    pub tmpid: String,
    pub line_number: u64,
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    pub asset_code: String,
    pub asset: Option<AssetRecord>,
    pub shares: Decimal,
    pub cost_per_share: Decimal,
    pub currency_code: String,
    pub currency_id: Option<String>,
    pub status: RowStatus,
    pub error: Option<String>,
}

impl ImportCandidateRow {
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// A row can be committed once both references resolved and no error was
    /// recorded.
    pub fn is_selectable(&self) -> bool {
        !self.has_error() && self.asset.is_some() && self.currency_id.is_some()
    }

    /// Records an error, replacing any previous one.
    pub fn mark_error(&mut self, message: impl Into<String>) {
        self.status = RowStatus::Error;
        self.error = Some(message.into());
    }

    /// Records an error unless one is already present. The status is set
    /// either way.
    pub fn mark_error_if_clean(&mut self, message: impl Into<String>) {
        self.status = RowStatus::Error;
        if self.error.is_none() {
            self.error = Some(message.into());
        }
    }

    /// Write payload for this row, if both references are resolved.
    pub fn to_new_transaction(&self, portfolio_id: &str) -> Option<NewTransaction> {
        let asset = self.asset.as_ref()?;
        let currency_id = self.currency_id.as_ref()?;
        Some(NewTransaction {
            portfolio_id: portfolio_id.to_string(),
            asset_id: asset.id.clone(),
            currency_id: currency_id.clone(),
            date: self.date,
            transaction_type: self.transaction_type,
            shares: self.shares,
            cost_per_share: self.cost_per_share,
        })
    }
}

/// Distinct row error with the number of rows carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportErrorCount {
    pub message: String,
    pub count: usize,
}

/// Outcome of a commit run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    pub failed: usize,
    /// Selected rows that were not eligible for commit.
    pub skipped: usize,
}

/// Serializable view of an import session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSessionSnapshot {
    pub session_id: String,
    pub portfolio_id: String,
    pub step: ImportStep,
    pub stages: ValidationStageStatus,
    pub valid: bool,
    pub rows: Vec<ImportCandidateRow>,
}
