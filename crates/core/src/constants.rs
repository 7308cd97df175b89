/// Decimal precision used when rounding values for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Decimal precision kept for average cost values handed to a UI
pub const AVERAGE_COST_DISPLAY_PRECISION: u32 = 6;
