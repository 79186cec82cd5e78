//! Catalog service.

use async_trait::async_trait;
use mockall::automock;
use rusty_money::iso::Currency;
use storefront::products::{ProductSnapshot, ProductUuid};
use tracing::info;

use crate::{
    database::Db,
    domain::catalog::{
        errors::CatalogServiceError,
        records::{NewProduct, ProductRecord},
        repository::PgCatalogRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCatalogService {
    db: Db,
    repository: PgCatalogRepository,
    currency: &'static Currency,
}

impl PgCatalogService {
    #[must_use]
    pub fn new(db: Db, currency: &'static Currency) -> Self {
        Self {
            db,
            repository: PgCatalogRepository::new(),
            currency,
        }
    }

    fn snapshots(
        &self,
        records: &[ProductRecord],
    ) -> Result<Vec<ProductSnapshot<'static>>, CatalogServiceError> {
        records
            .iter()
            .map(|record| record.snapshot(self.currency))
            .collect()
    }
}

#[async_trait]
impl CatalogService for PgCatalogService {
    #[tracing::instrument(name = "catalog.service.list_products", skip(self), err)]
    async fn list_products(&self) -> Result<Vec<ProductSnapshot<'static>>, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let records = self.repository.list_products(&mut tx).await?;

        tx.commit().await?;

        self.snapshots(&records)
    }

    #[tracing::instrument(
        name = "catalog.service.get_products",
        skip(self, products),
        fields(product_count = products.len()),
        err
    )]
    async fn get_products(
        &self,
        products: Vec<ProductUuid>,
    ) -> Result<Vec<ProductSnapshot<'static>>, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let records = self.repository.get_products(&mut tx, &products).await?;

        tx.commit().await?;

        self.snapshots(&records)
    }

    #[tracing::instrument(
        name = "catalog.service.create_product",
        skip(self, product),
        fields(product_uuid = %product.uuid),
        err
    )]
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductSnapshot<'static>, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_product(&mut tx, product).await?;

        tx.commit().await?;

        info!(product_uuid = %created.uuid, "created product");

        created.snapshot(self.currency)
    }

    #[tracing::instrument(
        name = "catalog.service.update_stock",
        skip(self),
        fields(product_uuid = %product),
        err
    )]
    async fn update_stock(
        &self,
        product: ProductUuid,
        stock: u32,
    ) -> Result<ProductSnapshot<'static>, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self.repository.update_stock(&mut tx, product, stock).await?;

        tx.commit().await?;

        info!(product_uuid = %updated.uuid, stock, "updated stock");

        updated.snapshot(self.currency)
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Retrieves every product, active or not.
    async fn list_products(&self) -> Result<Vec<ProductSnapshot<'static>>, CatalogServiceError>;

    /// Retrieves the products with the given UUIDs. Unknown UUIDs are left out.
    async fn get_products(
        &self,
        products: Vec<ProductUuid>,
    ) -> Result<Vec<ProductSnapshot<'static>>, CatalogServiceError>;

    /// Creates a new product.
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductSnapshot<'static>, CatalogServiceError>;

    /// Sets the units on hand for a product.
    async fn update_stock(
        &self,
        product: ProductUuid,
        stock: u32,
    ) -> Result<ProductSnapshot<'static>, CatalogServiceError>;
}
