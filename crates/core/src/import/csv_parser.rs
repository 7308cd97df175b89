//! Import file parsing.
//!
//! Turns a delimited text blob into typed candidate rows. Structural
//! validation is all-or-nothing: a single row that fails coercion rejects
//! the whole file.

use chrono::{DateTime, NaiveDate};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use super::import_constants::{IMPORT_DATE_FORMATS, IMPORT_FIELD_COUNT};
use super::import_errors::ImportError;
use super::import_model::{ImportCandidateRow, RowStatus};
use super::import_settings::ImportSettings;
use crate::errors::Result;
use crate::transactions::TransactionType;

/// Parses the content of an import file into candidate rows.
///
/// Records whose field count differs from six are dropped before coercion,
/// which tolerates blank lines and trailing separators. Settings that do not
/// pass `ImportSettings::validate` are rejected before the content is read.
pub fn parse_import_content(
    content: &[u8],
    settings: &ImportSettings,
) -> Result<Vec<ImportCandidateRow>> {
    settings.validate()?;
    Ok(parse_rows(content, settings)?)
}

/// Parsing proper. `settings` must already be validated.
pub(crate) fn parse_rows(
    content: &[u8],
    settings: &ImportSettings,
) -> std::result::Result<Vec<ImportCandidateRow>, ImportError> {
    let text = decode_content(content)?;

    let mut reader = ReaderBuilder::new()
        .delimiter(settings.delimiter_byte())
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(idx as u64 + 1);
            ImportError::structure_at(line, e.to_string())
        })?;

        if record.len() != IMPORT_FIELD_COUNT {
            dropped += 1;
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or(idx as u64 + 1);
        rows.push(parse_record(&record, line)?);
    }

    if dropped > 0 {
        debug!(
            "Dropped {} record(s) without exactly {} fields",
            dropped, IMPORT_FIELD_COUNT
        );
    }

    if rows.len() > settings.max_rows {
        return Err(ImportError::Capacity {
            max_rows: settings.max_rows,
        });
    }

    if rows.is_empty() {
        return Err(ImportError::structure(
            "The import file does not contain any transaction",
        ));
    }

    Ok(rows)
}

/// Decodes content bytes to UTF-8, stripping a leading BOM.
fn decode_content(content: &[u8]) -> std::result::Result<&str, ImportError> {
    let content = content.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(content);
    std::str::from_utf8(content).map_err(|e| {
        ImportError::structure(format!(
            "Invalid UTF-8 encoding at byte {}",
            e.valid_up_to()
        ))
    })
}

fn parse_record(
    record: &StringRecord,
    line: u64,
) -> std::result::Result<ImportCandidateRow, ImportError> {
    let field = |idx: usize| record.get(idx).unwrap_or_default();

    let date = parse_date(field(0)).ok_or_else(|| {
        ImportError::structure_at(line, format!("invalid date '{}'", field(0)))
    })?;
    let transaction_type = TransactionType::from_str(field(1))
        .map_err(|e| ImportError::structure_at(line, e))?;
    let asset_code = field(2).to_string();
    if asset_code.is_empty() {
        return Err(ImportError::structure_at(line, "missing asset code"));
    }
    let shares = parse_amount(field(3), line, "shares")?;
    let cost_per_share = parse_amount(field(4), line, "cost per share")?;
    let currency_code = field(5).to_string();
    if currency_code.is_empty() {
        return Err(ImportError::structure_at(line, "missing currency code"));
    }

    Ok(ImportCandidateRow {
        tmpid: Uuid::new_v4().to_string(),
        line_number: line,
        date,
        transaction_type,
        asset_code,
        asset: None,
        shares,
        cost_per_share,
        currency_code,
        currency_id: None,
        status: RowStatus::Validating,
        error: None,
    })
}

/// Accepts RFC 3339 date-times (truncated to their date) and the layouts in
/// `IMPORT_DATE_FORMATS`.
fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }
    IMPORT_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Parses a non-negative decimal in plain or scientific notation.
fn parse_amount(
    value: &str,
    line: u64,
    name: &str,
) -> std::result::Result<Decimal, ImportError> {
    if value.is_empty() {
        return Err(ImportError::structure_at(line, format!("missing {}", name)));
    }

    let parsed = if value.contains(['e', 'E']) {
        Decimal::from_scientific(value)
    } else {
        Decimal::from_str(value)
    };

    match parsed {
        Ok(amount) if amount.is_sign_negative() && !amount.is_zero() => Err(
            ImportError::structure_at(line, format!("{} must not be negative: {}", name, value)),
        ),
        Ok(amount) => Ok(amount.normalize()),
        Err(_) => Err(ImportError::structure_at(
            line,
            format!("invalid {} '{}'", name, value),
        )),
    }
}
