//! Currency helpers

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::iso::{self, Currency};

/// Look up an ISO 4217 currency by its alphabetic code (`"IDR"`, `"GBP"`, ...).
pub fn lookup(code: &str) -> Option<&'static Currency> {
    iso::find(&code.trim().to_ascii_uppercase())
}

/// Convert an amount in major units into minor units of `currency`.
///
/// Returns `None` when the amount is negative or doesn't fit in `i64`.
pub fn to_minor_units(amount: Decimal, currency: &Currency) -> Option<i64> {
    if amount.is_sign_negative() {
        return None;
    }

    let scale = 10_i64.checked_pow(currency.exponent)?;

    amount
        .checked_mul(Decimal::from(scale))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}
