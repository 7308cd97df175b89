/// Field delimiter of import files.
pub const DEFAULT_IMPORT_DELIMITER: char = ';';

/// Maximum number of rows accepted in a single import file.
pub const IMPORT_LIST_LIMIT: usize = 100;

/// Delay between two consecutive row commits.
pub const DEFAULT_COMMIT_DELAY_MS: u64 = 1000;

/// date; type; asset code; shares; cost per share; currency code
pub const IMPORT_FIELD_COUNT: usize = 6;

// Row and stage messages shown to the operator.
pub const ASSET_NOT_FOUND: &str = "Asset not found";
pub const CURRENCY_NOT_FOUND: &str = "Currency not found";
pub const IMPORT_TRANSACTION_FAILED: &str = "Failed to import transaction";
pub const SHARES_MUST_BE_POSITIVE: &str = "Shares must be greater than zero";
pub const NO_ASSETS_FOUND: &str = "No assets found";
pub const NO_CURRENCIES_FOUND: &str = "No currencies found";

/// Accepted layouts for the date column, tried in order after RFC 3339.
pub const IMPORT_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
