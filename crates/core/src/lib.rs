//! Tickerbook Core - Domain entities, services, and traits.
//!
//! This crate contains the position accounting engine and the bulk
//! transaction import pipeline. It is storage-agnostic: repositories,
//! reference lookups and the holding store are traits implemented by the
//! embedding application.

pub mod assets;
pub mod constants;
pub mod currencies;
pub mod errors;
pub mod events;
pub mod holdings;
pub mod import;
pub mod transactions;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
