//! Orders Service

use async_trait::async_trait;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    auth::UserUuid,
    database::Db,
    domain::{
        carts::repository::PgCartsRepository,
        orders::{
            OrdersServiceError,
            records::{NewOrder, Order, OrderRecord, OrderStatus, OrderUuid},
            repository::PgOrdersRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    orders: PgOrdersRepository,
    carts: PgCartsRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            orders: PgOrdersRepository::new(),
            carts: PgCartsRepository::new(),
        }
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.settle_order",
        skip(self, order),
        fields(
            order_uuid = %order.uuid,
            user_uuid = %order.user,
            line_count = order.lines.len(),
            amount_due = order.amount_due
        ),
        err
    )]
    async fn settle_order(&self, order: NewOrder) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.orders.insert_order(&mut tx, &order).await?;

        let mut lines = Vec::with_capacity(order.lines.len());

        for (position, line) in order.lines.iter().enumerate() {
            lines.push(
                self.orders
                    .insert_line(&mut tx, order.uuid, line, position)
                    .await?,
            );
        }

        let mut discounts = Vec::with_capacity(order.discounts.len());

        for (position, discount) in order.discounts.iter().enumerate() {
            discounts.push(
                self.orders
                    .insert_discount(&mut tx, order.uuid, discount, position)
                    .await?,
            );
        }

        for requirement in &order.stock {
            if !self.orders.reserve_stock(&mut tx, *requirement).await? {
                warn!(
                    order_uuid = %order.uuid,
                    product_uuid = %requirement.product,
                    units = requirement.units,
                    "stock changed before the order settled"
                );

                return Err(OrdersServiceError::StockConflict(requirement.product));
            }
        }

        self.carts.clear(&mut tx, order.user).await?;

        tx.commit().await?;

        info!(order_uuid = %record.uuid, amount_due = record.amount_due, "settled order");

        Ok(Order {
            record,
            lines,
            discounts,
        })
    }

    #[tracing::instrument(
        name = "orders.service.list_orders",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let orders = self.orders.list_orders(&mut tx, user).await?;

        tx.commit().await?;

        Ok(orders)
    }

    #[tracing::instrument(
        name = "orders.service.get_order",
        skip(self),
        fields(order_uuid = %order),
        err
    )]
    async fn get_order(
        &self,
        owner: Option<UserUuid>,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.orders.get_order(&mut tx, order, owner).await?;
        let lines = self.orders.list_lines(&mut tx, order).await?;
        let discounts = self.orders.list_discounts(&mut tx, order).await?;

        tx.commit().await?;

        Ok(Order {
            record,
            lines,
            discounts,
        })
    }

    #[tracing::instrument(
        name = "orders.service.update_status",
        skip(self),
        fields(order_uuid = %order, status = %status),
        err
    )]
    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self.orders.update_status(&mut tx, order, status).await?;

        tx.commit().await?;

        info!(order_uuid = %updated.uuid, status = %updated.status, "updated order status");

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Writes the order, its lines and discounts, takes the stock and clears the user's cart,
    /// all in one transaction.
    ///
    /// Fails with [`OrdersServiceError::StockConflict`] and changes nothing when a product can
    /// no longer cover its units.
    async fn settle_order(&self, order: NewOrder) -> Result<Order, OrdersServiceError>;

    /// Retrieves a user's orders, newest first.
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Retrieves an order with its lines and discounts. With an `owner`, other users' orders
    /// are reported as not found.
    async fn get_order(
        &self,
        owner: Option<UserUuid>,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError>;

    /// Moves an order to a new status.
    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rusty_money::Money;
    use storefront::{
        items::{CartLine, LineItem, LineItemError},
        pricing::price_cart,
        products::ProductUuid,
        settlement,
    };
    use testresult::TestResult;

    use crate::{
        domain::{carts::CartsService, catalog::CatalogService, checkout::ShippingDetails},
        test::{CURRENCY, TestContext},
    };

    use super::*;

    /// Price and plan the user's cart as it stands, without promotions or shipping.
    async fn freeze_cart(ctx: &TestContext, user: UserUuid) -> TestResult<NewOrder> {
        let items = ctx.carts.list_items(user).await?;
        let products = ctx
            .catalog
            .get_products(items.iter().map(|item| item.product).collect())
            .await?;

        let lines = items
            .iter()
            .map(|item| {
                let product = products.iter().find(|p| p.uuid == item.product).cloned();

                Ok(CartLine::new(LineItem::try_from(item)?, product))
            })
            .collect::<Result<Vec<_>, LineItemError>>()?;

        let priced = price_cart(lines, &[], Timestamp::now(), CURRENCY)?;
        let plan = settlement::plan(&priced)?;

        let shipping = ShippingDetails {
            full_name: "Ada Lovelace".to_string(),
            phone: "020 7946 0000".to_string(),
            address: "12 St James's Square, London".to_string(),
            notes: None,
        };

        Ok(NewOrder::freeze(
            user,
            &priced,
            &plan,
            Money::from_minor(0, CURRENCY),
            shipping,
        )?)
    }

    async fn stock_of(ctx: &TestContext, product: ProductUuid) -> TestResult<Option<u32>> {
        let products = ctx.catalog.get_products(vec![product]).await?;

        Ok(products.first().map(|p| p.stock))
    }

    #[tokio::test]
    async fn settling_takes_stock_and_clears_the_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let product = ctx.create_product(450, 5).await;

        ctx.carts.add_item(user, product.uuid, 2).await?;

        let order = freeze_cart(&ctx, user).await?;
        let settled = ctx.orders.settle_order(order).await?;

        assert_eq!(settled.record.status, OrderStatus::Pending);
        assert_eq!(settled.record.amount_due, 900);
        assert_eq!(settled.lines.len(), 1);
        assert_eq!(stock_of(&ctx, product.uuid).await?, Some(3));
        assert!(ctx.carts.list_items(user).await?.is_empty());

        let order = settled.record.uuid;

        assert_eq!(ctx.orders.get_order(Some(user), order).await?, settled);

        Ok(())
    }

    #[tokio::test]
    async fn stock_lowered_after_planning_rolls_the_order_back() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let product = ctx.create_product(450, 3).await;

        ctx.carts.add_item(user, product.uuid, 2).await?;

        let order = freeze_cart(&ctx, user).await?;

        ctx.catalog.update_stock(product.uuid, 1).await?;

        let result = ctx.orders.settle_order(order).await;

        assert!(matches!(
            result,
            Err(OrdersServiceError::StockConflict(conflicted)) if conflicted == product.uuid
        ));

        assert!(ctx.orders.list_orders(user).await?.is_empty());
        assert_eq!(stock_of(&ctx, product.uuid).await?, Some(1));

        let items = ctx.carts.list_items(user).await?;

        assert_eq!(items.len(), 1);
        assert_eq!(items.first().map(|item| item.quantity), Some(2));

        Ok(())
    }

    #[tokio::test]
    async fn other_users_orders_are_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let product = ctx.create_product(450, 5).await;

        ctx.carts.add_item(user, product.uuid, 1).await?;

        let order = freeze_cart(&ctx, user).await?;
        let order = ctx.orders.settle_order(order).await?.record.uuid;

        let stranger = ctx.orders.get_order(Some(UserUuid::new()), order).await;

        assert!(matches!(stranger, Err(OrdersServiceError::NotFound)));
        assert!(ctx.orders.get_order(None, order).await.is_ok());

        Ok(())
    }
}
