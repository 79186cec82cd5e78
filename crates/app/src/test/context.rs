//! Services wired to a throwaway database.

use rusty_money::iso::{Currency, GBP};
use storefront::{
    ids::{BrandUuid, CategoryUuid},
    products::{ProductSnapshot, ProductUuid},
};

use crate::{
    database::Db,
    domain::{
        carts::PgCartsService,
        catalog::{CatalogService, PgCatalogService, records::NewProduct},
        orders::PgOrdersService,
        promotions::PgPromotionsService,
    },
};

use super::db::TestDb;

pub(crate) const CURRENCY: &Currency = GBP;

pub(crate) struct TestContext {
    pub db: TestDb,
    pub catalog: PgCatalogService,
    pub promotions: PgPromotionsService,
    pub carts: PgCartsService,
    pub orders: PgOrdersService,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        Self {
            catalog: PgCatalogService::new(db.clone(), CURRENCY),
            promotions: PgPromotionsService::new(db.clone()),
            carts: PgCartsService::new(db.clone()),
            orders: PgOrdersService::new(db),
            db: test_db,
        }
    }

    /// Store an active product with the given price in pence and units on hand.
    pub async fn create_product(&self, price: u64, stock: u32) -> ProductSnapshot<'static> {
        self.catalog
            .create_product(NewProduct {
                uuid: ProductUuid::new(),
                name: "Earl Grey".to_string(),
                price,
                stock,
                active: true,
                category: CategoryUuid::new(),
                brand: BrandUuid::new(),
            })
            .await
            .expect("Failed to create test product")
    }
}
