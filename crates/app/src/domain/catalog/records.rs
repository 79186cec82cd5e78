//! Catalog Records

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use storefront::{
    ids::{BrandUuid, CategoryUuid},
    products::{ProductSnapshot, ProductUuid},
};

use crate::domain::catalog::CatalogServiceError;

/// Product Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    pub price: u64,
    pub stock: u32,
    pub active: bool,
    pub category: CategoryUuid,
    pub brand: BrandUuid,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProductRecord {
    /// Pricing view of the product in the store currency.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::InvalidPrice`] if the price doesn't fit in minor units.
    pub fn snapshot(
        &self,
        currency: &'static Currency,
    ) -> Result<ProductSnapshot<'static>, CatalogServiceError> {
        Ok(ProductSnapshot {
            uuid: self.uuid,
            name: self.name.clone(),
            price: Money::from_minor(i64::try_from(self.price)?, currency),
            stock: self.stock,
            active: self.active,
            category: self.category,
            brand: self.brand,
        })
    }
}

/// New Product Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub price: u64,
    pub stock: u32,
    pub active: bool,
    pub category: CategoryUuid,
    pub brand: BrandUuid,
}
