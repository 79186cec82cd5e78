//! Discount utilities
//!
//! Minor-unit arithmetic shared by the promotion effect calculations. Prices are never
//! converted to floating point; percentages are applied in decimal space and rounded once.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::MoneyError;
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Summing unit prices overflowed.
    #[error("discount amount overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Build a [`Percentage`] from whole percentage points (`10` is 10%).
pub fn percentage_from_points(points: u8) -> Percentage {
    Percentage::from(Decimal::from(points) / Decimal::ONE_HUNDRED)
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows or cannot be
/// represented in minor units.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Sum the `count` cheapest unit prices.
///
/// `units` holds `(unit price, quantity)` pairs; every unit of quantity counts as its own entry,
/// so the result equals sorting the flattened unit prices and summing the first `count`. When
/// `count` exceeds the number of units the sum covers every unit.
///
/// # Errors
///
/// Returns [`DiscountError::Overflow`] if the sum can't be represented.
pub fn cheapest_units_total(mut units: Vec<(i64, u64)>, count: u64) -> Result<i64, DiscountError> {
    units.sort_unstable_by_key(|&(price, _)| price);

    let mut remaining = count;
    let mut total = 0_i64;

    for (price, quantity) in units {
        if remaining == 0 {
            break;
        }

        let taken = quantity.min(remaining);
        remaining -= taken;

        let taken = i64::try_from(taken).map_err(|_err| DiscountError::Overflow)?;

        total = price
            .checked_mul(taken)
            .and_then(|value| total.checked_add(value))
            .ok_or(DiscountError::Overflow)?;
    }

    Ok(total)
}
