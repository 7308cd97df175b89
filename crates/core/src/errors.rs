//! Core error types for the Tickerbook core.
//!
//! This module defines storage-agnostic error types. Collaborators backed by a
//! database or a remote service convert their own failures into these types.

use chrono::{NaiveDate, ParseError as ChronoParseError};
use thiserror::Error;

use crate::import::ImportError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Holdings calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error("Failed to load configuration: {0}")]
    ConfigIO(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Reference lookup failed: {0}")]
    Lookup(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Storage-agnostic error type for persistence collaborators.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// A query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A foreign key constraint was violated.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Errors that occur while folding a transaction history into a holding.
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("Invalid transaction data: {0}")]
    InvalidTransaction(String),

    #[error(
        "Insufficient shares for asset {asset_id} in portfolio {portfolio_id} on date {date}: held {held}, sold {sold}"
    )]
    InsufficientShares {
        asset_id: String,
        portfolio_id: String,
        date: NaiveDate,
        held: rust_decimal::Decimal,
        sold: rust_decimal::Decimal,
    },

    #[error("Transaction {transaction_id} belongs to {found}, expected {expected}")]
    MixedPositions {
        transaction_id: String,
        expected: String,
        found: String,
    },

    #[error("Calculation failed: {0}")]
    Calculation(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigIO(err.to_string())
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
