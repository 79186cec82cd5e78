//! Product Fixtures

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{currency, fixtures::FixtureError};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Product price (e.g., "45000 IDR")
    pub price: String,

    /// Units in stock
    #[serde(default)]
    pub stock: u32,

    /// Category key, shared between products and promotion targets
    pub category: String,

    /// Brand key, shared between products and promotion targets
    pub brand: String,

    /// Whether the product can be sold
    #[serde(default = "default_active")]
    pub active: bool,
}

pub(crate) const fn default_active() -> bool {
    true
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if the amount is not a
/// non-negative decimal, or if the currency code is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency =
        currency::lookup(code).ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

    let minor_units = amount
        .parse::<Decimal>()
        .ok()
        .and_then(|amount| currency::to_minor_units(amount, currency))
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}
