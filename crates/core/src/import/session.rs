//! Import session state.
//!
//! An `ImportSession` owns everything one import run needs: the parsed rows,
//! the per-stage status map and the overall step. Rows are shared as an
//! `Arc<Vec<_>>` and replaced wholesale on every change, so a reader holding
//! a previous `rows()` handle keeps a consistent copy.

use log::{debug, info};
use std::sync::Arc;
use uuid::Uuid;

use super::csv_parser::parse_rows;
use super::import_errors::ImportError;
use super::import_model::{
    ImportCandidateRow, ImportErrorCount, ImportSessionSnapshot, ImportStep, StageStatus,
    ValidationStage, ValidationStageStatus,
};
use super::import_settings::ImportSettings;
use crate::errors::Result;
use crate::events::{DomainEvent, DomainEventSink};

pub struct ImportSession {
    session_id: String,
    portfolio_id: String,
    settings: ImportSettings,
    step: ImportStep,
    stages: ValidationStageStatus,
    rows: Arc<Vec<ImportCandidateRow>>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl ImportSession {
    pub fn new(
        portfolio_id: impl Into<String>,
        settings: ImportSettings,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            session_id: Uuid::new_v4().to_string(),
            portfolio_id: portfolio_id.into(),
            settings,
            step: ImportStep::Validation,
            stages: ValidationStageStatus::new(),
            rows: Arc::new(Vec::new()),
            event_sink,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn portfolio_id(&self) -> &str {
        &self.portfolio_id
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    pub fn step(&self) -> ImportStep {
        self.step
    }

    pub fn stages(&self) -> &ValidationStageStatus {
        &self.stages
    }

    /// Shared handle on the current rows.
    pub fn rows(&self) -> Arc<Vec<ImportCandidateRow>> {
        Arc::clone(&self.rows)
    }

    pub fn row(&self, tmpid: &str) -> Option<&ImportCandidateRow> {
        self.rows.iter().find(|row| row.tmpid == tmpid)
    }

    /// The import may proceed once the currencies stage succeeded. Row-level
    /// errors do not block it.
    pub fn is_valid(&self) -> bool {
        self.stages.is_success(ValidationStage::Currencies)
    }

    /// Rows the operator may select for commit.
    pub fn selectable_rows(&self) -> Vec<&ImportCandidateRow> {
        self.rows.iter().filter(|row| row.is_selectable()).collect()
    }

    /// Distinct row errors with their number of occurrences, in first-seen
    /// order.
    pub fn error_summary(&self) -> Vec<ImportErrorCount> {
        let mut summary: Vec<ImportErrorCount> = Vec::new();
        for message in self.rows.iter().filter_map(|row| row.error.as_deref()) {
            match summary.iter_mut().find(|entry| entry.message == message) {
                Some(entry) => entry.count += 1,
                None => summary.push(ImportErrorCount {
                    message: message.to_string(),
                    count: 1,
                }),
            }
        }
        summary
    }

    pub fn snapshot(&self) -> ImportSessionSnapshot {
        ImportSessionSnapshot {
            session_id: self.session_id.clone(),
            portfolio_id: self.portfolio_id.clone(),
            step: self.step,
            stages: self.stages.clone(),
            valid: self.is_valid(),
            rows: self.rows.as_ref().clone(),
        }
    }

    /// Parses `content` and stores the resulting rows.
    ///
    /// Drives the structure stage. Returns the number of rows retained.
    pub fn ingest(&mut self, content: &[u8]) -> Result<usize> {
        if self.step != ImportStep::Validation || !self.rows.is_empty() {
            return Err(ImportError::InvalidState(format!(
                "cannot ingest a file in step {:?} with {} row(s) loaded; reset the session first",
                self.step,
                self.rows.len()
            ))
            .into());
        }

        self.set_stage(ValidationStage::Structure, StageStatus::InProgress);
        match parse_rows(content, &self.settings) {
            Ok(rows) => {
                let count = rows.len();
                self.event_sink.emit(DomainEvent::import_rows_changed(
                    self.session_id.clone(),
                    rows.clone(),
                ));
                self.rows = Arc::new(rows);
                self.set_stage(ValidationStage::Structure, StageStatus::Success);
                info!("Import session {}: parsed {} row(s)", self.session_id, count);
                Ok(count)
            }
            Err(e) => {
                self.set_stage(ValidationStage::Structure, StageStatus::Error);
                Err(e.into())
            }
        }
    }

    /// Discards rows and stage statuses so another file can be ingested.
    pub fn reset(&mut self) -> Result<()> {
        match self.step {
            ImportStep::Validation | ImportStep::Review => {
                self.clear();
                Ok(())
            }
            step => Err(ImportError::InvalidState(format!(
                "cannot reset an import session in step {:?}",
                step
            ))
            .into()),
        }
    }

    /// Dismisses the session once the operator is done with it.
    pub fn finish(&mut self) -> Result<()> {
        match self.step {
            ImportStep::Done | ImportStep::Review => {
                self.clear();
                Ok(())
            }
            step => Err(ImportError::InvalidState(format!(
                "cannot finish an import session in step {:?}",
                step
            ))
            .into()),
        }
    }

    fn clear(&mut self) {
        debug!("Import session {}: discarding transient state", self.session_id);
        let had_rows = !self.rows.is_empty();
        self.rows = Arc::new(Vec::new());
        self.stages.clear();
        if had_rows {
            self.event_sink
                .emit(DomainEvent::import_rows_cleared(self.session_id.clone()));
        }
        self.set_step(ImportStep::Validation);
    }

    pub(crate) fn set_stage(&mut self, stage: ValidationStage, status: StageStatus) {
        self.stages.set(stage, status);
        debug!(
            "Import session {}: stage {} is now {:?}",
            self.session_id, stage, status
        );
        self.event_sink.emit(DomainEvent::import_stage_changed(
            self.session_id.clone(),
            stage,
            status,
        ));
    }

    pub(crate) fn set_step(&mut self, step: ImportStep) {
        if self.step == step {
            return;
        }
        self.step = step;
        self.event_sink
            .emit(DomainEvent::import_step_changed(self.session_id.clone(), step));
    }

    /// Applies `update` to a copy of every row and swaps the copy in.
    ///
    /// `update` returns true when it changed the row; the new state of the
    /// changed rows is reported in a single `ImportRowsChanged` event.
    pub(crate) fn update_rows<F>(&mut self, mut update: F) -> usize
    where
        F: FnMut(&mut ImportCandidateRow) -> bool,
    {
        let mut rows = self.rows.as_ref().clone();
        let changed: Vec<ImportCandidateRow> = rows
            .iter_mut()
            .filter_map(|row| update(row).then(|| row.clone()))
            .collect();

        if changed.is_empty() {
            return 0;
        }

        let count = changed.len();
        self.rows = Arc::new(rows);
        self.event_sink.emit(DomainEvent::import_rows_changed(
            self.session_id.clone(),
            changed,
        ));
        count
    }

    /// Applies `update` to the row with `tmpid`, if present.
    pub(crate) fn update_row<F>(&mut self, tmpid: &str, update: F) -> bool
    where
        F: FnOnce(&mut ImportCandidateRow),
    {
        let mut update = Some(update);
        self.update_rows(|row| match update.take() {
            Some(f) if row.tmpid == tmpid => {
                f(row);
                true
            }
            Some(f) => {
                update = Some(f);
                false
            }
            None => false,
        }) > 0
    }
}
