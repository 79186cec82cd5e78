//! Checkout Service

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use storefront::{
    items::{CartLine, LineItem},
    pricing::{PricedCart, price_cart},
    products::{ProductSnapshot, ProductUuid},
    settlement::{self, SettlementError},
};
use tracing::{info, warn};

use crate::{
    auth::{Session, UserUuid},
    domain::{
        carts::CartsService,
        catalog::CatalogService,
        checkout::{CheckoutError, ShippingDetails, ShippingPolicy},
        orders::{
            OrdersService,
            records::{NewOrder, Order},
        },
        promotions::PromotionsService,
    },
};

/// A priced cart with the shipping fee it would be charged.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutPreview {
    /// Cart priced with the promotions in effect
    pub priced: PricedCart<'static>,

    /// Fee for the discounted total, zero for an empty cart
    pub shipping_fee: Money<'static, Currency>,
}

impl CheckoutPreview {
    /// Discounted total plus shipping.
    #[must_use]
    pub fn amount_due(&self) -> Money<'static, Currency> {
        Money::from_minor(
            self.priced
                .final_total()
                .to_minor_units()
                .saturating_add(self.shipping_fee.to_minor_units()),
            self.priced.currency(),
        )
    }
}

/// Checkout backed by the store services.
#[derive(Clone)]
pub struct StoreCheckoutService {
    carts: Arc<dyn CartsService>,
    catalog: Arc<dyn CatalogService>,
    promotions: Arc<dyn PromotionsService>,
    orders: Arc<dyn OrdersService>,
    currency: &'static Currency,
    shipping: ShippingPolicy,
}

impl StoreCheckoutService {
    #[must_use]
    pub fn new(
        carts: Arc<dyn CartsService>,
        catalog: Arc<dyn CatalogService>,
        promotions: Arc<dyn PromotionsService>,
        orders: Arc<dyn OrdersService>,
        currency: &'static Currency,
        shipping: ShippingPolicy,
    ) -> Self {
        Self {
            carts,
            catalog,
            promotions,
            orders,
            currency,
            shipping,
        }
    }

    /// Load the user's cart lines with current product data.
    async fn cart_lines(&self, user: UserUuid) -> Result<Vec<CartLine<'static>>, CheckoutError> {
        let items = self.carts.list_items(user).await?;

        if items.is_empty() {
            return Ok(Vec::new());
        }

        let products: FxHashMap<ProductUuid, ProductSnapshot<'static>> = self
            .catalog
            .get_products(items.iter().map(|item| item.product).collect())
            .await?
            .into_iter()
            .map(|product| (product.uuid, product))
            .collect();

        items
            .iter()
            .map(|item| {
                let line = LineItem::try_from(item)?;
                let product = products.get(&item.product).cloned();

                Ok(CartLine::new(line, product))
            })
            .collect()
    }

    async fn price(
        &self,
        user: UserUuid,
        now: Timestamp,
    ) -> Result<PricedCart<'static>, CheckoutError> {
        let lines = self.cart_lines(user).await?;

        let promotions = if lines.is_empty() {
            Vec::new()
        } else {
            self.promotions.list_effective(now).await?
        };

        Ok(price_cart(lines, &promotions, now, self.currency)?)
    }
}

#[async_trait]
impl CheckoutService for StoreCheckoutService {
    #[tracing::instrument(name = "checkout.service.preview", skip(self), err)]
    async fn preview(&self, session: Session) -> Result<CheckoutPreview, CheckoutError> {
        let user = session.user().ok_or(CheckoutError::Unauthenticated)?;

        let priced = self.price(user, Timestamp::now()).await?;
        let shipping_fee = if priced.is_empty() {
            Money::from_minor(0, self.currency)
        } else {
            self.shipping.fee_for(priced.final_total())
        };

        Ok(CheckoutPreview {
            priced,
            shipping_fee,
        })
    }

    #[tracing::instrument(
        name = "checkout.service.checkout",
        skip(self, shipping),
        fields(user_uuid = tracing::field::Empty),
        err
    )]
    async fn checkout(
        &self,
        session: Session,
        shipping: ShippingDetails,
    ) -> Result<Order, CheckoutError> {
        let user = session.user().ok_or(CheckoutError::Unauthenticated)?;

        tracing::Span::current().record("user_uuid", tracing::field::display(user));

        let shipping = shipping.validate()?;

        let priced = self.price(user, Timestamp::now()).await?;

        if priced.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let plan = settlement::plan(&priced).inspect_err(|error| {
            if let SettlementError::StockConflict {
                product,
                requested,
                available,
                ..
            } = error
            {
                warn!(
                    user_uuid = %user,
                    product_uuid = %product,
                    requested,
                    available,
                    "not enough stock to check out"
                );
            }
        })?;

        let shipping_fee = self.shipping.fee_for(priced.final_total());
        let order = NewOrder::freeze(user, &priced, &plan, shipping_fee, shipping)?;

        let order = self.orders.settle_order(order).await?;

        info!(
            order_uuid = %order.record.uuid,
            user_uuid = %user,
            amount_due = order.record.amount_due,
            "checked out"
        );

        Ok(order)
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Prices the signed-in user's cart as it would be charged right now.
    async fn preview(&self, session: Session) -> Result<CheckoutPreview, CheckoutError>;

    /// Re-prices the cart, checks stock and settles it into an order.
    ///
    /// Nothing is written when the cart is empty, a product is unavailable or stock is short.
    async fn checkout(
        &self,
        session: Session,
        shipping: ShippingDetails,
    ) -> Result<Order, CheckoutError>;
}
