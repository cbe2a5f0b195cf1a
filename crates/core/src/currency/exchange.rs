//! Exchange rate consistency rule for payment rows.

use paydesk_shared::types::Currency;
use rust_decimal::Decimal;

/// Checks the currency/rate pairing of a payment row.
///
/// Local rows must carry a rate of exactly 1. Foreign rows must carry a rate
/// other than 1, which also rejects a foreign currency whose market rate
/// really is 1.0.
#[must_use]
pub fn rate_is_consistent(currency: Currency, rate: Decimal) -> bool {
    if currency.is_local() {
        rate == Decimal::ONE
    } else {
        rate != Decimal::ONE
    }
}
