use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Legal monthly base for a 35h/week contract (35 × 52 / 12)
pub const LEGAL_MONTHLY_HOURS: Decimal = dec!(151.67);

/// Flat 25% premium on every overtime hour
pub const OVERTIME_MULTIPLIER: Decimal = dec!(1.25);

/// Quick-preview employer charge estimate, never stored on a payslip
pub const FLAT_EMPLOYER_ESTIMATE_RATE: Decimal = dec!(0.42);

/// Currency amounts are kept to the cent
pub const CURRENCY_SCALE: u32 = 2;
