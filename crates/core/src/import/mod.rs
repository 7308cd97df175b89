//! Import module - bulk transaction import from a delimited text file.
//!
//! The pipeline is split in three parts that operate on one `ImportSession`:
//! - ingest: parse the file into candidate rows (structure stage)
//! - `ImportValidator`: resolve assets and currencies with one batched lookup
//!   each and flag row-level errors
//! - `ImportCommitter`: write the selected rows one by one, throttled

mod committer;
mod csv_parser;
mod import_constants;
mod import_errors;
mod import_model;
mod import_settings;
mod session;
mod validator;

pub use committer::ImportCommitter;
pub use csv_parser::parse_import_content;
pub use import_constants::*;
pub use import_errors::ImportError;
pub use import_model::{
    ImportCandidateRow, ImportErrorCount, ImportSessionSnapshot, ImportStep, ImportSummary,
    RowStatus, StageStatus, ValidationStage, ValidationStageStatus,
};
pub use import_settings::ImportSettings;
pub use session::ImportSession;
pub use validator::ImportValidator;
