//! Store Config

use clap::Args;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use storefront::currency;

use crate::{config::ConfigError, domain::checkout::ShippingPolicy};

/// Store-wide pricing settings.
#[derive(Debug, Clone, Args)]
pub struct StoreConfig {
    /// ISO 4217 code of the currency prices are stored in
    #[arg(long, env = "STORE_CURRENCY", default_value = "IDR", global = true)]
    pub currency: String,

    /// Shipping fee, in major units of the store currency
    #[arg(long, env = "SHIPPING_FEE", default_value = "10000", global = true)]
    pub shipping_fee: Decimal,

    /// Orders whose discounted total is above this amount ship free
    #[arg(
        long,
        env = "FREE_SHIPPING_THRESHOLD",
        default_value = "100000",
        global = true
    )]
    pub free_shipping_threshold: Decimal,
}

impl StoreConfig {
    /// Resolve the configured currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] when the code isn't an ISO 4217 currency.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        currency::lookup(&self.currency)
            .ok_or_else(|| ConfigError::UnknownCurrency(self.currency.clone()))
    }

    /// Shipping fee and free-shipping threshold in minor units.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown currency or a negative or oversized amount.
    pub fn shipping_policy(&self) -> Result<ShippingPolicy, ConfigError> {
        self.shipping_policy_in(self.currency()?)
    }

    /// Shipping amounts read as major units of `currency` instead of the store currency.
    ///
    /// # Errors
    ///
    /// Returns an error for a negative or oversized amount.
    pub fn shipping_policy_in(
        &self,
        currency: &'static Currency,
    ) -> Result<ShippingPolicy, ConfigError> {
        let amount = |name: &'static str, value: Decimal| {
            currency::to_minor_units(value, currency)
                .map(|minor| Money::from_minor(minor, currency))
                .ok_or_else(|| ConfigError::InvalidAmount {
                    name,
                    value: value.to_string(),
                })
        };

        Ok(ShippingPolicy::new(
            amount("shipping fee", self.shipping_fee)?,
            amount("free shipping threshold", self.free_shipping_threshold)?,
        ))
    }
}
