//! Staged validation of an ingested import session.
//!
//! Stages run strictly in sequence: assets, then the business-rule pass,
//! then currencies. Each reference stage issues exactly one batched lookup.
//! A row keeps the first error recorded against it, so an asset error is
//! never replaced by a currency error.

use log::{info, warn};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;

use super::import_constants::{ASSET_NOT_FOUND, CURRENCY_NOT_FOUND, SHARES_MUST_BE_POSITIVE};
use super::import_errors::ImportError;
use super::import_model::{ImportStep, StageStatus, ValidationStage};
use super::session::ImportSession;
use crate::assets::{find_asset_for_code, AssetLookupTrait};
use crate::currencies::{CurrencyIndex, CurrencyLookupTrait};
use crate::errors::{Error, Result};

pub struct ImportValidator {
    asset_lookup: Arc<dyn AssetLookupTrait>,
    currency_lookup: Arc<dyn CurrencyLookupTrait>,
}

impl ImportValidator {
    pub fn new(
        asset_lookup: Arc<dyn AssetLookupTrait>,
        currency_lookup: Arc<dyn CurrencyLookupTrait>,
    ) -> Self {
        Self {
            asset_lookup,
            currency_lookup,
        }
    }

    /// Runs the reference and business-rule stages on an ingested session.
    ///
    /// On success the session moves to `Review`. A stage-level failure leaves
    /// the session in `Validation` with that stage in `Error`; the operator
    /// resets and starts over.
    pub async fn validate(&self, session: &mut ImportSession) -> Result<()> {
        if session.step() != ImportStep::Validation
            || !session.stages().is_success(ValidationStage::Structure)
            || session.stages().get(ValidationStage::Assets) != StageStatus::Pending
        {
            return Err(ImportError::InvalidState(format!(
                "validation requires a freshly ingested file (step {:?}, structure {:?})",
                session.step(),
                session.stages().get(ValidationStage::Structure)
            ))
            .into());
        }

        self.resolve_assets(session).await?;
        apply_business_rules(session);
        self.resolve_currencies(session).await?;

        let selectable = session.selectable_rows().len();
        info!(
            "Import session {} validated: {} of {} row(s) selectable",
            session.session_id(),
            selectable,
            session.rows().len()
        );
        session.set_step(ImportStep::Review);
        Ok(())
    }

    async fn resolve_assets(&self, session: &mut ImportSession) -> Result<()> {
        session.set_stage(ValidationStage::Assets, StageStatus::InProgress);

        let codes = distinct_codes(session.rows().iter().map(|row| row.asset_code.as_str()));
        let records = match self.asset_lookup.lookup_by_codes(&codes).await {
            Ok(records) => records,
            Err(e) => return Err(fail_stage(session, ValidationStage::Assets, e)),
        };

        let total = session.update_rows(|row| {
            match find_asset_for_code(&records, &row.asset_code) {
                Some(asset) => row.asset = Some(asset.clone()),
                None => row.mark_error_if_clean(ASSET_NOT_FOUND),
            }
            true
        });
        let matched = session.rows().iter().filter(|row| row.asset.is_some()).count();

        if matched == 0 {
            warn!(
                "Import session {}: none of {} asset code(s) resolved",
                session.session_id(),
                codes.len()
            );
            session.set_stage(ValidationStage::Assets, StageStatus::Error);
            return Err(ImportError::NoAssetsFound.into());
        }

        info!(
            "Import session {}: {} of {} row(s) resolved to an asset",
            session.session_id(),
            matched,
            total
        );
        session.set_stage(ValidationStage::Assets, StageStatus::Success);
        Ok(())
    }

    async fn resolve_currencies(&self, session: &mut ImportSession) -> Result<()> {
        session.set_stage(ValidationStage::Currencies, StageStatus::InProgress);

        let records = match self.currency_lookup.list_currencies().await {
            Ok(records) => records,
            Err(e) => return Err(fail_stage(session, ValidationStage::Currencies, e)),
        };
        let index = CurrencyIndex::from_records(&records);

        session.update_rows(|row| {
            match index.resolve(&row.currency_code) {
                Some(currency_id) => row.currency_id = Some(currency_id.to_string()),
                None => row.mark_error_if_clean(CURRENCY_NOT_FOUND),
            }
            true
        });
        let matched = session
            .rows()
            .iter()
            .filter(|row| row.currency_id.is_some())
            .count();

        if matched == 0 {
            warn!(
                "Import session {}: no currency code resolved",
                session.session_id()
            );
            session.set_stage(ValidationStage::Currencies, StageStatus::Error);
            return Err(ImportError::NoCurrenciesFound.into());
        }

        session.set_stage(ValidationStage::Currencies, StageStatus::Success);
        Ok(())
    }
}

/// Row-level business rules that do not need reference data.
fn apply_business_rules(session: &mut ImportSession) {
    session.set_stage(ValidationStage::Transactions, StageStatus::InProgress);
    session.update_rows(|row| {
        if row.shares == Decimal::ZERO && !row.has_error() {
            row.mark_error(SHARES_MUST_BE_POSITIVE);
            return true;
        }
        false
    });
    session.set_stage(ValidationStage::Transactions, StageStatus::Success);
}

/// Distinct values in first-seen order.
fn distinct_codes<'a>(codes: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    codes
        .filter(|code| seen.insert(*code))
        .map(str::to_string)
        .collect()
}

fn fail_stage(session: &mut ImportSession, stage: ValidationStage, error: Error) -> Error {
    warn!(
        "Import session {}: {} lookup failed: {}",
        session.session_id(),
        stage,
        error
    );
    session.set_stage(stage, StageStatus::Error);
    ImportError::Lookup {
        stage,
        message: error.to_string(),
    }
    .into()
}
