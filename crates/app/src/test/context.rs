//! Test context for service-level integration tests.

use std::sync::Arc;

use crate::{
    database::Db,
    domain::{
        addresses::PgAddressesService, carts::PgCartsService, coupons::PgCouponsService,
        orders::PgOrdersService, products::PgProductsService, settings::PgSettingsService,
    },
    notifications::{LogNotifier, OrderNotifier},
};

use super::TestDb;

pub(crate) struct TestContext {
    pub db: TestDb,
    pub products: PgProductsService,
    pub carts: PgCartsService,
    pub coupons: PgCouponsService,
    pub settings: PgSettingsService,
    pub addresses: PgAddressesService,
    pub orders: PgOrdersService,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_notifier(Arc::new(LogNotifier)).await
    }

    pub async fn with_notifier(notifier: Arc<dyn OrderNotifier>) -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        Self {
            products: PgProductsService::new(db.clone()),
            carts: PgCartsService::new(db.clone()),
            coupons: PgCouponsService::new(db.clone()),
            settings: PgSettingsService::new(db.clone()),
            addresses: PgAddressesService::new(db.clone()),
            orders: PgOrdersService::new(db, notifier),
            db: test_db,
        }
    }
}
