//! Currency conversion logic.
//!
//! CRITICAL: Rounding strategy for multi-currency:
//! - Engine totals are exact, no rounding while deriving
//! - Display values use banker's rounding (round half to even)

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

/// Normalizes an amount to local currency terms.
///
/// Returns `None` when the product does not fit in a `Decimal`.
#[must_use]
pub fn to_local(amount: Decimal, rate: Decimal) -> Option<Decimal> {
    amount.checked_mul(rate)
}

/// Rounds a value for display using banker's rounding.
#[must_use]
pub fn round_for_display(value: Decimal, decimal_places: u32) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
}
