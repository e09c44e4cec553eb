//! Coupons Repository

use jiff_sqlx::{Date as SqlxDate, Timestamp as SqlxTimestamp};
use nutbasket::coupons::{CouponStatus, CouponUsage};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    database::{quantity_param, try_get_optional_count, try_get_variant},
    domain::{
        coupons::{
            data::NewCoupon,
            records::{CouponRecord, CouponSummary, CouponUuid},
        },
        users::UserUuid,
    },
};

const FIND_COUPON_BY_CODE_SQL: &str = include_str!("sql/find_coupon_by_code.sql");
const LOCK_COUPON_BY_CODE_SQL: &str = include_str!("sql/lock_coupon_by_code.sql");
const GET_COUPON_SQL: &str = include_str!("sql/get_coupon.sql");
const CREATE_COUPON_SQL: &str = include_str!("sql/create_coupon.sql");
const SET_COUPON_STATUS_SQL: &str = include_str!("sql/set_coupon_status.sql");
const LIST_COUPONS_SQL: &str = include_str!("sql/list_coupons.sql");
const COUNT_COUPON_USAGES_SQL: &str = include_str!("sql/count_coupon_usages.sql");
const RECORD_COUPON_USAGE_SQL: &str = include_str!("sql/record_coupon_usage.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Look a coupon up by code, ignoring case. With `lock`, the row stays locked until the
    /// transaction ends so concurrent redemptions of the same coupon queue behind each other.
    pub(crate) async fn find_coupon_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
        lock: bool,
    ) -> Result<Option<CouponRecord>, sqlx::Error> {
        let sql = if lock {
            LOCK_COUPON_BY_CODE_SQL
        } else {
            FIND_COUPON_BY_CODE_SQL
        };

        query_as::<Postgres, CouponRecord>(sql)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<CouponRecord, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(GET_COUPON_SQL)
            .bind(coupon.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: NewCoupon,
    ) -> Result<CouponRecord, sqlx::Error> {
        let usage_limit = coupon
            .usage_limit
            .map(|limit| quantity_param("usage_limit", limit))
            .transpose()?;

        let user_limit = coupon
            .user_limit
            .map(|limit| quantity_param("user_limit", limit))
            .transpose()?;

        query_as::<Postgres, CouponRecord>(CREATE_COUPON_SQL)
            .bind(coupon.uuid.into_uuid())
            .bind(coupon.code)
            .bind(coupon.discount_type.as_str())
            .bind(coupon.discount_value)
            .bind(coupon.max_discount_amount)
            .bind(coupon.min_order_amount)
            .bind(coupon.valid_from.map(SqlxDate::from))
            .bind(coupon.valid_to.map(SqlxDate::from))
            .bind(usage_limit)
            .bind(user_limit)
            .bind(coupon.status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_coupon_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
        status: CouponStatus,
    ) -> Result<CouponRecord, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(SET_COUPON_STATUS_SQL)
            .bind(coupon.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_coupons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<CouponSummary>, sqlx::Error> {
        query_as::<Postgres, CouponSummary>(LIST_COUPONS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    /// Count redemptions overall and, for signed-in shoppers, by `user`.
    pub(crate) async fn count_usages(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
        user: Option<UserUuid>,
    ) -> Result<CouponUsage, sqlx::Error> {
        let (total, by_user): (i64, i64) = query_as(COUNT_COUPON_USAGES_SQL)
            .bind(coupon.into_uuid())
            .bind(user.map(UserUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await?;

        let count = |col: &str, value: i64| {
            u64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
                index: col.to_string(),
                source: Box::new(e),
            })
        };

        Ok(CouponUsage {
            total: count("total", total)?,
            by_user: user.map(|_| count("by_user", by_user)).transpose()?,
        })
    }

    pub(crate) async fn record_usage(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
        user: Option<UserUuid>,
        order: Uuid,
    ) -> Result<(), sqlx::Error> {
        query(RECORD_COUPON_USAGE_SQL)
            .bind(Uuid::now_v7())
            .bind(coupon.into_uuid())
            .bind(user.map(UserUuid::into_uuid))
            .bind(order)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for CouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CouponUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            discount_type: try_get_variant(row, "discount_type")?,
            discount_value: row.try_get("discount_value")?,
            max_discount_amount: row.try_get("max_discount_amount")?,
            min_order_amount: row.try_get("min_order_amount")?,
            valid_from: row
                .try_get::<Option<SqlxDate>, _>("valid_from")?
                .map(SqlxDate::to_jiff),
            valid_to: row
                .try_get::<Option<SqlxDate>, _>("valid_to")?
                .map(SqlxDate::to_jiff),
            usage_limit: try_get_optional_count(row, "usage_limit")?,
            user_limit: try_get_optional_count(row, "user_limit")?,
            status: try_get_variant(row, "status")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CouponSummary {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let times_used: i64 = row.try_get("times_used")?;

        Ok(Self {
            coupon: CouponRecord::from_row(row)?,
            times_used: u64::try_from(times_used).map_err(|e| sqlx::Error::ColumnDecode {
                index: "times_used".to_string(),
                source: Box::new(e),
            })?,
        })
    }
}
