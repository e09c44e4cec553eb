//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        addresses::{AddressesService, PgAddressesService},
        carts::{CartsService, PgCartsService},
        coupons::{CouponsService, PgCouponsService},
        orders::{OrdersService, PgOrdersService},
        products::{PgProductsService, ProductsService},
        settings::{PgSettingsService, SettingsService},
    },
    notifications::{LogNotifier, OrderNotifier, WebhookNotifier},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub carts: Arc<dyn CartsService>,
    pub coupons: Arc<dyn CouponsService>,
    pub settings: Arc<dyn SettingsService>,
    pub addresses: Arc<dyn AddressesService>,
    pub orders: Arc<dyn OrdersService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// Placed orders are POSTed to `webhook_url` when one is given and logged otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(
        url: &str,
        webhook_url: Option<String>,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        let notifier: Arc<dyn OrderNotifier> = match webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(url)),
            None => Arc::new(LogNotifier),
        };

        Ok(Self::new(Db::new(pool), notifier))
    }

    #[must_use]
    pub fn new(db: Db, notifier: Arc<dyn OrderNotifier>) -> Self {
        Self {
            products: Arc::new(PgProductsService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone())),
            coupons: Arc::new(PgCouponsService::new(db.clone())),
            settings: Arc::new(PgSettingsService::new(db.clone())),
            addresses: Arc::new(PgAddressesService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(db, notifier)),
        }
    }
}
