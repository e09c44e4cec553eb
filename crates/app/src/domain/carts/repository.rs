//! Cart Items Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::{
    database::{quantity_param, try_get_count, try_get_variant},
    domain::{
        carts::{
            data::CartOwner,
            records::{CartItemRecord, CartItemUuid, CartLine},
        },
        products::records::ProductUuid,
        users::UserUuid,
    },
};

const GET_CART_LINES_SQL: &str = include_str!("sql/get_cart_lines.sql");
const LOCK_CART_LINES_SQL: &str = include_str!("sql/lock_cart_lines.sql");
const GET_CART_LINE_SQL: &str = include_str!("sql/get_cart_line.sql");
const FIND_CART_ITEM_SQL: &str = include_str!("sql/find_cart_item.sql");
const CREATE_CART_ITEM_SQL: &str = include_str!("sql/create_cart_item.sql");
const SET_CART_ITEM_QUANTITY_SQL: &str = include_str!("sql/set_cart_item_quantity.sql");
const MOVE_CART_ITEM_SQL: &str = include_str!("sql/move_cart_item.sql");
const DELETE_CART_ITEM_SQL: &str = include_str!("sql/delete_cart_item.sql");
const CLEAR_CART_SQL: &str = include_str!("sql/clear_cart.sql");
const COUNT_CART_UNITS_SQL: &str = include_str!("sql/count_cart_units.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_cart_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
    ) -> Result<Vec<CartLine>, sqlx::Error> {
        query_as::<Postgres, CartLine>(GET_CART_LINES_SQL)
            .bind(owner.user_uuid())
            .bind(owner.session_id())
            .fetch_all(&mut **tx)
            .await
    }

    /// Fetch the cart for checkout, locking its lines so the same cart cannot be ordered twice.
    pub(crate) async fn lock_cart_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
    ) -> Result<Vec<CartLine>, sqlx::Error> {
        query_as::<Postgres, CartLine>(LOCK_CART_LINES_SQL)
            .bind(owner.user_uuid())
            .bind(owner.session_id())
            .fetch_all(&mut **tx)
            .await
    }

    /// Fetch and lock one of `owner`'s lines.
    pub(crate) async fn get_cart_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
        item: CartItemUuid,
    ) -> Result<CartLine, sqlx::Error> {
        query_as::<Postgres, CartLine>(GET_CART_LINE_SQL)
            .bind(item.into_uuid())
            .bind(owner.user_uuid())
            .bind(owner.session_id())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch and lock `owner`'s line for `product`, if there is one.
    pub(crate) async fn find_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
        product: ProductUuid,
    ) -> Result<Option<CartItemRecord>, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(FIND_CART_ITEM_SQL)
            .bind(product.into_uuid())
            .bind(owner.user_uuid())
            .bind(owner.session_id())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartItemRecord, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(CREATE_CART_ITEM_SQL)
            .bind(CartItemUuid::new().into_uuid())
            .bind(owner.user_uuid())
            .bind(owner.session_id())
            .bind(product.into_uuid())
            .bind(quantity_param("quantity", quantity)?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_cart_item_quantity(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<CartItemRecord, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(SET_CART_ITEM_QUANTITY_SQL)
            .bind(item.into_uuid())
            .bind(quantity_param("quantity", quantity)?)
            .fetch_one(&mut **tx)
            .await
    }

    /// Hand a session line over to `user`.
    pub(crate) async fn move_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemUuid,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MOVE_CART_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
        item: CartItemUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(owner.user_uuid())
            .bind(owner.session_id())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn clear_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLEAR_CART_SQL)
            .bind(owner.user_uuid())
            .bind(owner.session_id())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn count_cart_units(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
    ) -> Result<u64, sqlx::Error> {
        let units: i64 = query_scalar(COUNT_CART_UNITS_SQL)
            .bind(owner.user_uuid())
            .bind(owner.session_id())
            .fetch_one(&mut **tx)
            .await?;

        u64::try_from(units).map_err(|e| sqlx::Error::ColumnDecode {
            index: "units".to_string(),
            source: Box::new(e),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CartItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartItemUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            quantity: try_get_count(row, "quantity")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CartLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            item_uuid: CartItemUuid::from_uuid(row.try_get("item_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            image: row.try_get("image")?,
            price: row.try_get("price")?,
            stock_quantity: try_get_count(row, "stock_quantity")?,
            status: try_get_variant(row, "status")?,
            quantity: try_get_count(row, "quantity")?,
        })
    }
}
