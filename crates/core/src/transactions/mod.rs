//! Transactions module - domain models, repository contract and the write service.

mod transactions_constants;
mod transactions_model;
mod transactions_service;
mod transactions_traits;

pub use transactions_constants::*;
pub use transactions_model::{sort_transactions, NewTransaction, Transaction, TransactionType};
pub use transactions_service::TransactionService;
pub use transactions_traits::{TransactionRepositoryTrait, TransactionWriterTrait};
