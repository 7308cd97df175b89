/// Transaction type for acquisitions
pub const TRANSACTION_TYPE_BUY: &str = "BUY";

/// Transaction type for disposals
pub const TRANSACTION_TYPE_SELL: &str = "SELL";
