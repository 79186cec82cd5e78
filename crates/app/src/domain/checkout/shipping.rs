//! Shipping

use rusty_money::{Money, iso::Currency};
use serde::Serialize;
use thiserror::Error;

/// Flat shipping fee, waived above a discounted-total threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingPolicy {
    fee: Money<'static, Currency>,
    free_above: Money<'static, Currency>,
}

impl ShippingPolicy {
    #[must_use]
    pub fn new(fee: Money<'static, Currency>, free_above: Money<'static, Currency>) -> Self {
        Self { fee, free_above }
    }

    /// Flat fee charged when shipping isn't free.
    #[must_use]
    pub fn fee(&self) -> Money<'static, Currency> {
        self.fee
    }

    /// Totals strictly above this amount ship free.
    #[must_use]
    pub fn free_above(&self) -> Money<'static, Currency> {
        self.free_above
    }

    /// Shipping fee for an order with the given discounted total.
    #[must_use]
    pub fn fee_for(&self, final_total: Money<'_, Currency>) -> Money<'static, Currency> {
        if final_total.to_minor_units() > self.free_above.to_minor_units() {
            Money::from_minor(0, self.fee.currency())
        } else {
            self.fee
        }
    }
}

/// A required shipping field was left blank.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0} is required")]
pub struct MissingShippingField(pub &'static str);

/// Where an order is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingDetails {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub notes: Option<String>,
}

impl ShippingDetails {
    /// Trim every field, dropping blank notes.
    ///
    /// # Errors
    ///
    /// Returns [`MissingShippingField`] naming the first required field that is blank.
    pub fn validate(self) -> Result<Self, MissingShippingField> {
        let required = |value: String, field: &'static str| {
            let trimmed = value.trim();

            if trimmed.is_empty() {
                Err(MissingShippingField(field))
            } else {
                Ok(trimmed.to_string())
            }
        };

        Ok(Self {
            full_name: required(self.full_name, "full name")?,
            phone: required(self.phone, "phone")?,
            address: required(self.address, "address")?,
            notes: self
                .notes
                .map(|notes| notes.trim().to_string())
                .filter(|notes| !notes.is_empty()),
        })
    }
}
