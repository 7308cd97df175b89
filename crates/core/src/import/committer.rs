//! Sequential, throttled commit of the selected import rows.

use log::{debug, error, info};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use super::import_constants::IMPORT_TRANSACTION_FAILED;
use super::import_errors::ImportError;
use super::import_model::{ImportStep, ImportSummary, RowStatus};
use super::session::ImportSession;
use crate::errors::{Error, Result};
use crate::transactions::{NewTransaction, TransactionWriterTrait};

pub struct ImportCommitter {
    writer: Arc<dyn TransactionWriterTrait>,
}

impl ImportCommitter {
    pub fn new(writer: Arc<dyn TransactionWriterTrait>) -> Self {
        Self { writer }
    }

    /// Writes the selected rows one at a time.
    ///
    /// Rows that are unknown, carry an error or lack a resolved reference are
    /// skipped. A failed write marks its row and the run continues with the
    /// next one. The configured delay is applied between two writes, never
    /// after the last one. There is no retry and no cancellation.
    pub async fn commit(
        &self,
        session: &mut ImportSession,
        selected_tmpids: &[String],
    ) -> Result<ImportSummary> {
        if session.step() != ImportStep::Review || !session.is_valid() {
            return Err(ImportError::InvalidState(format!(
                "commit requires a validated session in review (step {:?})",
                session.step()
            ))
            .into());
        }

        let mut seen = HashSet::new();
        let mut queue: VecDeque<(String, NewTransaction)> = VecDeque::new();
        let mut summary = ImportSummary::default();
        for tmpid in selected_tmpids {
            if !seen.insert(tmpid.as_str()) {
                continue;
            }
            let payload = session
                .row(tmpid)
                .filter(|row| row.is_selectable())
                .and_then(|row| row.to_new_transaction(session.portfolio_id()));
            match payload {
                Some(payload) => queue.push_back((tmpid.clone(), payload)),
                None => {
                    debug!("Skipping row {}: unknown or not importable", tmpid);
                    summary.skipped += 1;
                }
            }
        }

        session.set_step(ImportStep::Importing);
        let queued: HashSet<&str> = queue.iter().map(|(tmpid, _)| tmpid.as_str()).collect();
        session.update_rows(|row| {
            if queued.contains(row.tmpid.as_str()) {
                row.status = RowStatus::Importing;
                return true;
            }
            false
        });
        info!(
            "Import session {}: committing {} row(s), {} skipped",
            session.session_id(),
            queue.len(),
            summary.skipped
        );

        let delay = session.settings().commit_delay();
        let timeout = session.settings().commit_timeout();

        while let Some((tmpid, payload)) = queue.pop_front() {
            match self.write(payload, timeout).await {
                Ok(()) => {
                    summary.imported += 1;
                    session.update_row(&tmpid, |row| row.status = RowStatus::Done);
                }
                Err(e) => {
                    error!("Failed to import row {}: {}", tmpid, e);
                    summary.failed += 1;
                    session.update_row(&tmpid, |row| row.mark_error(IMPORT_TRANSACTION_FAILED));
                }
            }

            if !queue.is_empty() && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        session.set_step(ImportStep::Done);
        info!(
            "Import session {} finished: {} imported, {} failed, {} skipped",
            session.session_id(),
            summary.imported,
            summary.failed,
            summary.skipped
        );
        Ok(summary)
    }

    async fn write(&self, payload: NewTransaction, timeout: Option<Duration>) -> Result<()> {
        let write = self.writer.create_transaction(payload);
        let created = match timeout {
            Some(limit) => tokio::time::timeout(limit, write).await.map_err(|_| {
                Error::Unexpected(format!("transaction write timed out after {:?}", limit))
            })??,
            None => write.await?,
        };
        debug!("Imported transaction {}", created.id);
        Ok(())
    }
}
