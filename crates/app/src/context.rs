//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    config::{ConfigError, DatabaseConfig, StoreConfig},
    database::{self, Db},
    domain::{
        carts::{CartsService, PgCartsService},
        catalog::{CatalogService, PgCatalogService},
        checkout::{CheckoutService, StoreCheckoutService},
        orders::{OrdersService, PgOrdersService},
        promotions::{PgPromotionsService, PromotionsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Clone)]
pub struct AppContext {
    pub catalog: Arc<dyn CatalogService>,
    pub promotions: Arc<dyn PromotionsService>,
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub checkout: Arc<dyn CheckoutService>,
}

impl AppContext {
    /// Build application context from database and store settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the store settings are invalid or establishing a database
    /// connection fails.
    pub async fn connect(
        database: &DatabaseConfig,
        store: &StoreConfig,
    ) -> Result<Self, AppInitError> {
        let currency = store.currency()?;
        let shipping = store.shipping_policy()?;

        let pool = database::connect(&database.database_url)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool);

        let catalog: Arc<dyn CatalogService> =
            Arc::new(PgCatalogService::new(db.clone(), currency));
        let promotions: Arc<dyn PromotionsService> = Arc::new(PgPromotionsService::new(db.clone()));
        let carts: Arc<dyn CartsService> = Arc::new(PgCartsService::new(db.clone()));
        let orders: Arc<dyn OrdersService> = Arc::new(PgOrdersService::new(db));

        let checkout = Arc::new(StoreCheckoutService::new(
            Arc::clone(&carts),
            Arc::clone(&catalog),
            Arc::clone(&promotions),
            Arc::clone(&orders),
            currency,
            shipping,
        ));

        Ok(Self {
            catalog,
            promotions,
            carts,
            orders,
            checkout,
        })
    }
}
