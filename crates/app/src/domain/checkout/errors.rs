//! Checkout errors.

use std::num::TryFromIntError;

use storefront::{
    items::LineItemError, pricing::PricingError, products::ProductUuid,
    settlement::SettlementError,
};
use thiserror::Error;

use crate::domain::{
    carts::CartsServiceError, catalog::CatalogServiceError, checkout::MissingShippingField,
    orders::OrdersServiceError, promotions::PromotionsServiceError,
};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("sign in to continue")]
    Unauthenticated,

    #[error("your cart is empty")]
    EmptyCart,

    #[error(transparent)]
    MissingShippingDetails(#[from] MissingShippingField),

    /// Stock or availability check failed before anything was written.
    #[error(transparent)]
    Settlement(#[from] SettlementError),

    /// Stock ran out between pricing and settling.
    #[error("product {0} sold out while checking out, review your cart and try again")]
    StockChanged(ProductUuid),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    LineItem(#[from] LineItemError),

    #[error("order amount out of range")]
    InvalidAmount(#[from] TryFromIntError),

    #[error(transparent)]
    Carts(#[from] CartsServiceError),

    #[error(transparent)]
    Catalog(#[from] CatalogServiceError),

    #[error(transparent)]
    Promotions(#[from] PromotionsServiceError),

    #[error(transparent)]
    Orders(OrdersServiceError),
}

impl From<OrdersServiceError> for CheckoutError {
    fn from(error: OrdersServiceError) -> Self {
        match error {
            OrdersServiceError::StockConflict(product) => Self::StockChanged(product),
            other => Self::Orders(other),
        }
    }
}
