//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    currency,
    discounts::DiscountError,
    fixtures::{Fixture, FixtureError},
    ids::{BrandUuid, CategoryUuid, TypedUuid},
    items::{CartLine, LineItem, LineItemError, LineItemUuid},
    pricing::{AffectedLine, AppliedPromotion, PricedCart, PricingError, price_cart},
    products::{ProductSnapshot, ProductUuid},
    promotions::{
        Promotion, PromotionError, PromotionKind, PromotionScope, PromotionUuid, ValidityWindow,
    },
    receipt::{Receipt, ReceiptError},
    settlement::{SettlementError, SettlementLine, SettlementPlan, StockRequirement, plan},
};
