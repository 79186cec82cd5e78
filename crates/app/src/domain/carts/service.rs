//! Carts Service

use async_trait::async_trait;
use mockall::automock;
use storefront::products::ProductUuid;
use tracing::info;

use crate::{
    auth::UserUuid,
    database::Db,
    domain::carts::{CartsServiceError, records::CartItemRecord, repository::PgCartsRepository},
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    repository: PgCartsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCartsRepository::new(),
        }
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    #[tracing::instrument(
        name = "carts.service.list_items",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    async fn list_items(&self, user: UserUuid) -> Result<Vec<CartItemRecord>, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let items = self.repository.list_items(&mut tx, user).await?;

        tx.commit().await?;

        Ok(items)
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self),
        fields(user_uuid = %user, product_uuid = %product),
        err
    )]
    async fn add_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartItemRecord, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let item = self
            .repository
            .add_item(&mut tx, user, product, quantity)
            .await?;

        tx.commit().await?;

        Ok(item)
    }

    #[tracing::instrument(
        name = "carts.service.update_quantity",
        skip(self),
        fields(user_uuid = %user, product_uuid = %product),
        err
    )]
    async fn update_quantity(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Option<CartItemRecord>, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let item = if quantity == 0 {
            if self.repository.remove_item(&mut tx, user, product).await? == 0 {
                return Err(CartsServiceError::NotFound);
            }

            None
        } else {
            Some(
                self.repository
                    .update_quantity(&mut tx, user, product, quantity)
                    .await?,
            )
        };

        tx.commit().await?;

        Ok(item)
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self),
        fields(user_uuid = %user, product_uuid = %product),
        err
    )]
    async fn remove_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.remove_item(&mut tx, user, product).await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    #[tracing::instrument(
        name = "carts.service.clear",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    async fn clear(&self, user: UserUuid) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let removed = self.repository.clear(&mut tx, user).await?;

        tx.commit().await?;

        info!(user_uuid = %user, removed, "cleared cart");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieves the user's cart items in the order they were added.
    async fn list_items(&self, user: UserUuid) -> Result<Vec<CartItemRecord>, CartsServiceError>;

    /// Adds units of a product, merging with any existing line for it.
    async fn add_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// Replaces the quantity of a line. Zero removes the line and returns `None`.
    async fn update_quantity(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Option<CartItemRecord>, CartsServiceError>;

    /// Removes a product's line from the cart.
    async fn remove_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<(), CartsServiceError>;

    /// Empties the cart.
    async fn clear(&self, user: UserUuid) -> Result<(), CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    async fn adding_a_product_twice_merges_the_line() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let product = ctx.create_product(450, 10).await;

        let first = ctx.carts.add_item(user, product.uuid, 3).await?;
        let second = ctx.carts.add_item(user, product.uuid, 2).await?;

        assert_eq!(second.uuid, first.uuid);
        assert_eq!(second.quantity, 5);

        let items = ctx.carts.list_items(user).await?;

        assert_eq!(items.len(), 1);
        assert_eq!(items.first().map(|item| item.quantity), Some(5));

        Ok(())
    }

    #[tokio::test]
    async fn carts_are_kept_per_user() -> TestResult {
        let ctx = TestContext::new().await;
        let (alice, bob) = (UserUuid::new(), UserUuid::new());
        let product = ctx.create_product(450, 10).await;

        ctx.carts.add_item(alice, product.uuid, 1).await?;
        ctx.carts.add_item(bob, product.uuid, 4).await?;

        let items = ctx.carts.list_items(alice).await?;

        assert_eq!(items.len(), 1);
        assert_eq!(items.first().map(|item| item.quantity), Some(1));

        Ok(())
    }

    #[tokio::test]
    async fn zero_quantity_update_removes_the_line() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let product = ctx.create_product(450, 10).await;

        ctx.carts.add_item(user, product.uuid, 2).await?;

        let updated = ctx.carts.update_quantity(user, product.uuid, 0).await?;

        assert_eq!(updated, None);
        assert!(ctx.carts.list_items(user).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn removing_a_missing_line_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .carts
            .remove_item(UserUuid::new(), ProductUuid::new())
            .await;

        assert!(matches!(result, Err(CartsServiceError::NotFound)));

        Ok(())
    }
}
