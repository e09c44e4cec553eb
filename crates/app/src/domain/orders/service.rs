//! Orders service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::civil::Date;
use mockall::automock;
use nutbasket::{
    carts::{self, Priced},
    catalog::ProductStatus,
    order_numbers::OrderNumber,
    orders::{StockEffect, stock_effect},
    pricing::compute_totals,
};
use sqlx::{Connection, Postgres, Transaction, error::ErrorKind};
use tracing::{Span, info, warn};

use crate::{
    database::Db,
    domain::{
        addresses::PgAddressesRepository,
        carts::{PgCartItemsRepository, records::CartLine},
        coupons::{
            CouponLock, PgCouponsRepository, check_coupon, records::CouponValidation,
        },
        orders::{
            data::{CheckoutRequest, CouponPolicy, OrderStatusUpdate},
            errors::OrdersServiceError,
            records::{
                CheckoutOutcome, CheckoutRejection, OrderDetails, OrderRecord, OrderUuid,
                PlacedOrder,
            },
            repositories::{NewOrder, NewOrderItem, PgOrderItemsRepository, PgOrdersRepository},
        },
        products::PgProductsRepository,
        settings::PgSettingsRepository,
        users::UserUuid,
    },
    notifications::{OrderNotifier, OrderPlaced},
};

/// Attempts at finding an unused order number before giving up.
const ORDER_NUMBER_ATTEMPTS: usize = 2;

const ORDER_NUMBER_CONSTRAINT: &str = "orders_order_number_key";

#[derive(Clone)]
pub struct PgOrdersService {
    db: Db,
    orders: PgOrdersRepository,
    items: PgOrderItemsRepository,
    addresses: PgAddressesRepository,
    carts: PgCartItemsRepository,
    coupons: PgCouponsRepository,
    products: PgProductsRepository,
    settings: PgSettingsRepository,
    notifier: Arc<dyn OrderNotifier>,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, notifier: Arc<dyn OrderNotifier>) -> Self {
        Self {
            db,
            orders: PgOrdersRepository::new(),
            items: PgOrderItemsRepository::new(),
            addresses: PgAddressesRepository::new(),
            carts: PgCartItemsRepository::new(),
            coupons: PgCouponsRepository::new(),
            products: PgProductsRepository::new(),
            settings: PgSettingsRepository::new(),
            notifier,
        }
    }

    /// Steps of a checkout that run inside the caller's transaction. A rejection leaves partial
    /// writes behind; the caller must roll back.
    async fn place_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: &CheckoutRequest,
        today: Date,
    ) -> Result<CheckoutOutcome, OrdersServiceError> {
        let user = request.owner.user();

        let payment_method = request.payment_method.trim();

        if payment_method.is_empty() {
            return Ok(CheckoutOutcome::Rejected(
                CheckoutRejection::MissingPaymentMethod,
            ));
        }

        let address_usable = self
            .addresses
            .find_address(tx, request.address)
            .await?
            .is_some_and(|address| address.usable_by(user));

        if !address_usable {
            return Ok(CheckoutOutcome::Rejected(CheckoutRejection::AddressNotFound));
        }

        let lines = self.carts.lock_cart_lines(tx, &request.owner).await?;

        if lines.is_empty() {
            return Ok(CheckoutOutcome::Rejected(CheckoutRejection::EmptyCart));
        }

        if let Some(rejection) = lines.iter().find_map(check_line) {
            return Ok(CheckoutOutcome::Rejected(rejection));
        }

        let subtotal = carts::subtotal(&lines);

        let (coupon, dropped_coupon) = match request
            .coupon_code
            .as_deref()
            .filter(|code| !code.trim().is_empty())
        {
            Some(code) => {
                let validation = check_coupon(
                    &self.coupons,
                    tx,
                    code,
                    subtotal,
                    user,
                    today,
                    CouponLock::ForRedemption,
                )
                .await?;

                match (validation, request.coupon_policy) {
                    (CouponValidation::Valid(applied), _) => (Some(applied), None),
                    (CouponValidation::Invalid(rejection), CouponPolicy::Require) => {
                        return Ok(CheckoutOutcome::Rejected(CheckoutRejection::Coupon {
                            rejection,
                        }));
                    }
                    (CouponValidation::Invalid(rejection), CouponPolicy::DropIfInvalid) => {
                        (None, Some(rejection))
                    }
                }
            }
            None => (None, None),
        };

        let settings = self.settings.get_pricing_settings(tx).await?;

        let totals = compute_totals(
            subtotal,
            &settings,
            coupon.as_ref().map(|applied| &applied.discount),
        )?;

        let new_order = NewOrder {
            uuid: OrderUuid::new(),
            user_uuid: user,
            address_uuid: request.address,
            coupon_uuid: coupon.as_ref().map(|applied| applied.uuid),
            totals,
            payment_method: payment_method.to_string(),
            notes: request
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|notes| !notes.is_empty())
                .map(str::to_string),
        };

        let order = insert_order(&self.orders, tx, &new_order, || {
            OrderNumber::generate(today, &mut rand::thread_rng())
        })
        .await?;

        let new_items: Vec<NewOrderItem> = lines
            .iter()
            .map(|line| NewOrderItem {
                product_uuid: line.product_uuid,
                product_name: line.name.clone(),
                quantity: line.quantity,
                price: line.price,
                total: line.line_total(),
            })
            .collect();

        self.items
            .create_order_items(tx, order.uuid, &new_items)
            .await?;

        // Take stock in product order so concurrent checkouts lock rows in the same sequence.
        let mut by_product: Vec<&CartLine> = lines.iter().collect();
        by_product.sort_by_key(|line| line.product_uuid);

        for line in by_product {
            let taken = self
                .products
                .decrement_stock(tx, line.product_uuid, line.quantity)
                .await?;

            if !taken {
                let available = self
                    .products
                    .get_product(tx, line.product_uuid)
                    .await?
                    .stock_quantity;

                return Ok(CheckoutOutcome::Rejected(
                    CheckoutRejection::InsufficientStock {
                        product: line.product_uuid,
                        product_name: line.name.clone(),
                        requested: line.quantity,
                        available,
                    },
                ));
            }
        }

        if let Some(applied) = &coupon {
            self.coupons
                .record_usage(tx, applied.uuid, user, order.uuid.into_uuid())
                .await?;
        }

        self.carts.clear_cart(tx, &request.owner).await?;

        Ok(CheckoutOutcome::Placed(PlacedOrder {
            uuid: order.uuid,
            order_number: order.order_number.clone(),
            totals: order.totals(),
            coupon,
            dropped_coupon,
        }))
    }

    async fn order_details(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderRecord,
    ) -> Result<OrderDetails, OrdersServiceError> {
        let items = self.items.get_order_items(tx, order.uuid).await?;

        Ok(OrderDetails { order, items })
    }

    fn notify(&self, placed: &PlacedOrder) {
        let notifier = Arc::clone(&self.notifier);

        let event = OrderPlaced {
            order_uuid: placed.uuid,
            order_number: placed.order_number.clone(),
        };

        tokio::spawn(async move {
            if let Err(error) = notifier.order_placed(&event).await {
                warn!(
                    order_uuid = %event.order_uuid,
                    error = %error,
                    "order notification failed"
                );
            }
        });
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, request),
        fields(
            owner = %request.owner,
            order_uuid = tracing::field::Empty,
            order_number = tracing::field::Empty,
            rejection = tracing::field::Empty
        ),
        err
    )]
    async fn create_order(
        &self,
        request: CheckoutRequest,
        today: Date,
    ) -> Result<CheckoutOutcome, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let outcome = self.place_order(&mut tx, &request, today).await?;

        let span = Span::current();

        match &outcome {
            CheckoutOutcome::Placed(placed) => {
                tx.commit().await?;

                span.record("order_uuid", tracing::field::display(placed.uuid));
                span.record(
                    "order_number",
                    tracing::field::display(&placed.order_number),
                );

                info!(total_amount = %placed.totals.total_amount, "order placed");

                self.notify(placed);
            }
            CheckoutOutcome::Rejected(rejection) => {
                tx.rollback().await?;

                span.record("rejection", tracing::field::display(rejection));

                info!("checkout rejected");
            }
        }

        Ok(outcome)
    }

    #[tracing::instrument(
        name = "orders.service.update_order_status",
        skip(self, order, update),
        fields(
            order_uuid = %order,
            from = tracing::field::Empty,
            to = tracing::field::Empty,
            stock_restored = tracing::field::Empty
        ),
        err
    )]
    async fn update_order_status(
        &self,
        order: OrderUuid,
        update: OrderStatusUpdate,
    ) -> Result<OrderRecord, OrdersServiceError> {
        if update.is_empty() {
            return Err(OrdersServiceError::MissingRequiredData);
        }

        let mut tx = self.db.begin().await?;

        let current = self.orders.lock_order(&mut tx, order).await?;

        let order_status = update.order_status.unwrap_or(current.order_status);
        let payment_status = update.payment_status.unwrap_or(current.payment_status);

        let restore = stock_effect(current.order_status, order_status, current.stock_restored)
            == StockEffect::Restore;

        if restore {
            let mut items = self.items.get_order_items(&mut tx, order).await?;
            items.sort_by_key(|item| item.product_uuid);

            for item in &items {
                self.products
                    .restore_stock(&mut tx, item.product_uuid, item.quantity)
                    .await?;
            }
        }

        let updated = self
            .orders
            .update_order_status(
                &mut tx,
                order,
                order_status,
                payment_status,
                update.tracking_number.as_deref(),
                update.tracking_url.as_deref(),
                restore,
            )
            .await?;

        tx.commit().await?;

        let span = Span::current();

        span.record("from", tracing::field::display(current.order_status));
        span.record("to", tracing::field::display(order_status));
        span.record("stock_restored", restore);

        info!(payment_status = %payment_status, "updated order status");

        Ok(updated)
    }

    async fn get_order(&self, order: OrderUuid) -> Result<OrderDetails, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let order = self.orders.get_order(&mut tx, order).await?;
        let details = self.order_details(&mut tx, order).await?;

        tx.commit().await?;

        Ok(details)
    }

    async fn get_order_by_number(
        &self,
        order_number: &str,
    ) -> Result<OrderDetails, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let order = self
            .orders
            .get_order_by_number(&mut tx, order_number.trim())
            .await?;
        let details = self.order_details(&mut tx, order).await?;

        tx.commit().await?;

        Ok(details)
    }

    async fn list_orders_for_user(
        &self,
        user: UserUuid,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let orders = self.orders.list_orders_for_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(orders)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Turn the owner's cart into an order.
    ///
    /// Everything happens in one transaction: the cart is checked against live stock, the
    /// coupon is re-validated under a row lock, totals are priced from current settings, the
    /// order and its items are written, stock is taken, the coupon redemption is recorded and
    /// the cart is emptied. Business failures come back as [`CheckoutOutcome::Rejected`] with
    /// nothing written.
    async fn create_order(
        &self,
        request: CheckoutRequest,
        today: Date,
    ) -> Result<CheckoutOutcome, OrdersServiceError>;

    /// Change an order's statuses and tracking details. Cancelling puts the items back in
    /// stock, at most once per order.
    async fn update_order_status(
        &self,
        order: OrderUuid,
        update: OrderStatusUpdate,
    ) -> Result<OrderRecord, OrdersServiceError>;

    async fn get_order(&self, order: OrderUuid) -> Result<OrderDetails, OrdersServiceError>;

    async fn get_order_by_number(
        &self,
        order_number: &str,
    ) -> Result<OrderDetails, OrdersServiceError>;

    /// A user's orders, newest first.
    async fn list_orders_for_user(
        &self,
        user: UserUuid,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError>;
}

fn check_line(line: &CartLine) -> Option<CheckoutRejection> {
    if line.status != ProductStatus::Active {
        return Some(CheckoutRejection::ProductUnavailable {
            product: line.product_uuid,
            product_name: line.name.clone(),
        });
    }

    (line.quantity > line.stock_quantity).then(|| CheckoutRejection::InsufficientStock {
        product: line.product_uuid,
        product_name: line.name.clone(),
        requested: line.quantity,
        available: line.stock_quantity,
    })
}

/// Insert `order` under a fresh order number, regenerating once if the number is taken.
///
/// Each attempt runs in a savepoint so a clash does not abort the surrounding transaction.
async fn insert_order<F>(
    orders: &PgOrdersRepository,
    tx: &mut Transaction<'_, Postgres>,
    order: &NewOrder,
    mut next_number: F,
) -> Result<OrderRecord, OrdersServiceError>
where
    F: FnMut() -> OrderNumber,
{
    for _ in 0..ORDER_NUMBER_ATTEMPTS {
        let order_number = next_number();

        let mut savepoint = Connection::begin(&mut **tx).await?;

        match orders
            .create_order(&mut savepoint, order, &order_number)
            .await
        {
            Ok(record) => {
                savepoint.commit().await?;

                return Ok(record);
            }
            Err(error) if is_order_number_clash(&error) => {
                savepoint.rollback().await?;

                warn!(order_number = %order_number, "order number taken, regenerating");
            }
            Err(error) => return Err(error.into()),
        }
    }

    Err(OrdersServiceError::OrderNumberCollision)
}

fn is_order_number_clash(error: &sqlx::Error) -> bool {
    error.as_database_error().is_some_and(|error| {
        matches!(error.kind(), ErrorKind::UniqueViolation)
            && error.constraint() == Some(ORDER_NUMBER_CONSTRAINT)
    })
}
