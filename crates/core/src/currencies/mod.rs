//! Currencies module - reference records and the lookup collaborator.

mod currencies_model;
mod currencies_traits;

pub use currencies_model::{CurrencyIndex, CurrencyRecord};
pub use currencies_traits::CurrencyLookupTrait;
