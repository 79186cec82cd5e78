//! Fixtures
//!
//! YAML fixture sets for offline pricing: `products/<set>.yml`, `promotions/<set>.yml` and
//! `carts/<set>.yml` under a base directory.

use std::{fs, path::PathBuf};

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    fixtures::{
        carts::CartFixture,
        products::{ProductsFixture, parse_price},
        promotions::{PromotionsFixture, ScopeFixture},
    },
    ids::{BrandUuid, CategoryUuid},
    items::{CartLine, LineItem, LineItemError, LineItemUuid},
    pricing::{PricedCart, PricingError, price_cart},
    products::{ProductSnapshot, ProductUuid},
    promotions::{Promotion, PromotionError, PromotionScope, PromotionUuid},
};

pub mod carts;
pub mod products;
pub mod promotions;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Promotion not found
    #[error("Promotion not found: {0}")]
    PromotionNotFound(String),

    /// Invalid promotion data
    #[error("Invalid promotion data: {0}")]
    InvalidPromotionData(String),

    /// Promotion failed validation
    #[error(transparent)]
    Promotion(#[from] PromotionError),

    /// Cart line failed validation
    #[error(transparent)]
    LineItem(#[from] LineItemError),

    /// Pricing the fixture cart failed
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Category and brand keys, assigned UUIDs as they're first seen
    categories: FxHashMap<String, CategoryUuid>,
    brands: FxHashMap<String, BrandUuid>,

    /// Products by fixture key
    products: FxHashMap<String, ProductSnapshot<'static>>,

    /// Promotions in key order, with key lookups
    promotions: Vec<Promotion>,
    promotion_keys: FxHashMap<String, PromotionUuid>,

    /// Cart lines joined with their products
    lines: Vec<CartLine<'static>>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            categories: FxHashMap::default(),
            brands: FxHashMap::default(),
            products: FxHashMap::default(),
            promotions: Vec::new(),
            promotion_keys: FxHashMap::default(),
            lines: Vec::new(),
            currency: None,
        }
    }

    fn read(&self, kind: &str, name: &str) -> Result<String, FixtureError> {
        let file_path = self.base_path.join(kind).join(format!("{name}.yml"));

        Ok(fs::read_to_string(file_path)?)
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = serde_norway::from_str(&self.read("products", name)?)?;

        for (key, product_fixture) in fixture.products {
            let (minor_units, currency) = parse_price(&product_fixture.price)?;

            match self.currency {
                Some(existing) if existing != currency => {
                    return Err(FixtureError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
                Some(_) => {}
                None => self.currency = Some(currency),
            }

            let category = *self
                .categories
                .entry(product_fixture.category)
                .or_default();

            let brand = *self.brands.entry(product_fixture.brand).or_default();

            let product = ProductSnapshot {
                uuid: ProductUuid::new(),
                name: product_fixture.name,
                price: Money::from_minor(minor_units, currency),
                stock: product_fixture.stock,
                active: product_fixture.active,
                category,
                brand,
            };

            self.products.insert(key, product);
        }

        Ok(self)
    }

    /// Load promotions from a YAML fixture file
    ///
    /// Promotions keep the order of their keys so pricing output is stable. Targets that don't
    /// match a loaded category, brand or product get a fresh identifier and never fire.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a promotion is invalid.
    pub fn load_promotions(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: PromotionsFixture = serde_norway::from_str(&self.read("promotions", name)?)?;

        let mut entries: Vec<_> = fixture.promotions.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (key, promotion_fixture) in entries {
            let rule = promotion_fixture.rule();
            let uuid = PromotionUuid::new();

            let promotion = Promotion::new(
                uuid,
                rule.name.clone(),
                promotion_fixture.kind()?,
                rule.min_quantity,
                self.scope(rule.applies_to, rule.target.as_deref())?,
                rule.active,
                rule.window(),
            )?;

            self.promotions.push(promotion);
            self.promotion_keys.insert(key, uuid);
        }

        Ok(self)
    }

    fn scope(
        &self,
        applies_to: ScopeFixture,
        target: Option<&str>,
    ) -> Result<PromotionScope, FixtureError> {
        let target = || {
            target.ok_or_else(|| {
                FixtureError::InvalidPromotionData(format!(
                    "a target is required for {applies_to:?} promotions"
                ))
            })
        };

        Ok(match applies_to {
            ScopeFixture::All => PromotionScope::All,
            ScopeFixture::Category => PromotionScope::Category(
                self.categories.get(target()?).copied().unwrap_or_default(),
            ),
            ScopeFixture::Brand => {
                PromotionScope::Brand(self.brands.get(target()?).copied().unwrap_or_default())
            }
            ScopeFixture::Product => PromotionScope::Product(
                self.products
                    .get(target()?)
                    .map(|product| product.uuid)
                    .unwrap_or_default(),
            ),
        })
    }

    /// Load cart lines from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a referenced product doesn't exist,
    /// or a quantity is zero.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CartFixture = serde_norway::from_str(&self.read("carts", name)?)?;

        for item in fixture.items {
            let product = self.product(&item.product)?.clone();
            let line = LineItem::new(LineItemUuid::new(), product.uuid, item.quantity)?;

            self.lines.push(CartLine::new(line, Some(product)));
        }

        Ok(self)
    }

    /// Load a complete fixture set (products, promotions and cart with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_products(name)?
            .load_promotions(name)?
            .load_cart(name)?;

        Ok(fixture)
    }

    /// Get a product by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&ProductSnapshot<'static>, FixtureError> {
        self.products
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a promotion by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the promotion is not found.
    pub fn promotion(&self, key: &str) -> Result<&Promotion, FixtureError> {
        let uuid = self
            .promotion_keys
            .get(key)
            .ok_or_else(|| FixtureError::PromotionNotFound(key.to_string()))?;

        self.promotions
            .iter()
            .find(|promotion| promotion.uuid() == *uuid)
            .ok_or_else(|| FixtureError::PromotionNotFound(key.to_string()))
    }

    /// Get all promotions
    pub fn promotions(&self) -> &[Promotion] {
        &self.promotions
    }

    /// Get the cart lines
    pub fn lines(&self) -> &[CartLine<'static>] {
        &self.lines
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Price the fixture cart against the fixture promotions at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if no products are loaded or pricing fails.
    pub fn price(&self, now: Timestamp) -> Result<PricedCart<'static>, FixtureError> {
        let currency = self.currency()?;

        Ok(price_cart(self.lines.clone(), &self.promotions, now, currency)?)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
