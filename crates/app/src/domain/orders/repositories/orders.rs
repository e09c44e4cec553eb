//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use nutbasket::{
    order_numbers::OrderNumber,
    orders::{OrderStatus, PaymentStatus},
    pricing::Totals,
};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::{
    database::try_get_variant,
    domain::{
        addresses::records::AddressUuid,
        coupons::records::CouponUuid,
        orders::records::{OrderRecord, OrderUuid},
        users::UserUuid,
    },
};

const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const GET_ORDER_SQL: &str = include_str!("../sql/get_order.sql");
const GET_ORDER_BY_NUMBER_SQL: &str = include_str!("../sql/get_order_by_number.sql");
const LOCK_ORDER_SQL: &str = include_str!("../sql/lock_order.sql");
const LIST_ORDERS_FOR_USER_SQL: &str = include_str!("../sql/list_orders_for_user.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("../sql/update_order_status.sql");

/// Order header as written at checkout; statuses start out pending.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewOrder {
    pub(crate) uuid: OrderUuid,
    pub(crate) user_uuid: Option<UserUuid>,
    pub(crate) address_uuid: AddressUuid,
    pub(crate) coupon_uuid: Option<CouponUuid>,
    pub(crate) totals: Totals,
    pub(crate) payment_method: String,
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrder,
        order_number: &OrderNumber,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order_number.as_str())
            .bind(order.user_uuid.map(UserUuid::into_uuid))
            .bind(order.address_uuid.into_uuid())
            .bind(order.coupon_uuid.map(CouponUuid::into_uuid))
            .bind(order.totals.subtotal)
            .bind(order.totals.tax_amount)
            .bind(order.totals.shipping_amount)
            .bind(order.totals.discount_amount)
            .bind(order.totals.total_amount)
            .bind(&order.payment_method)
            .bind(order.notes.as_deref())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_by_number(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_number: &str,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_BY_NUMBER_SQL)
            .bind(order_number)
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch an order and hold its row lock until the transaction ends.
    pub(crate) async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LOCK_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders_for_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_ORDERS_FOR_USER_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Write new statuses. Tracking details are only overwritten when given, and
    /// `stock_restored` can be raised but never cleared.
    #[expect(
        clippy::too_many_arguments,
        reason = "each column of the status update is bound separately"
    )]
    pub(crate) async fn update_order_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        order_status: OrderStatus,
        payment_status: PaymentStatus,
        tracking_number: Option<&str>,
        tracking_url: Option<&str>,
        stock_restored: bool,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(order_status.as_str())
            .bind(payment_status.as_str())
            .bind(tracking_number)
            .bind(tracking_url)
            .bind(stock_restored)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            order_number: OrderNumber::from_stored(row.try_get("order_number")?),
            user_uuid: row
                .try_get::<Option<Uuid>, _>("user_uuid")?
                .map(UserUuid::from_uuid),
            address_uuid: AddressUuid::from_uuid(row.try_get("address_uuid")?),
            coupon_uuid: row
                .try_get::<Option<Uuid>, _>("coupon_uuid")?
                .map(CouponUuid::from_uuid),
            subtotal: row.try_get("subtotal")?,
            tax_amount: row.try_get("tax_amount")?,
            shipping_amount: row.try_get("shipping_amount")?,
            discount_amount: row.try_get("discount_amount")?,
            total_amount: row.try_get("total_amount")?,
            order_status: try_get_variant(row, "order_status")?,
            payment_status: try_get_variant(row, "payment_status")?,
            payment_method: row.try_get("payment_method")?,
            notes: row.try_get("notes")?,
            tracking_number: row.try_get("tracking_number")?,
            tracking_url: row.try_get("tracking_url")?,
            stock_restored: row.try_get("stock_restored")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
