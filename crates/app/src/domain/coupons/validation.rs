//! Coupon Validation

use jiff::civil::Date;
use nutbasket::coupons::{CouponRejection, normalize_code};
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};

use crate::domain::{
    coupons::{
        records::{AppliedCoupon, CouponValidation},
        repository::PgCouponsRepository,
    },
    users::UserUuid,
};

/// Whether the coupon row is locked for the rest of the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CouponLock {
    /// Read only, for previewing a code against a cart.
    Shared,

    /// Lock the row so usage counts cannot change before the redemption is recorded.
    ForRedemption,
}

/// Run the redemption rules for `code` against a cart.
///
/// Guests have no per-user history, so the per-user limit is never checked for them.
pub(crate) async fn check_coupon(
    repository: &PgCouponsRepository,
    tx: &mut Transaction<'_, Postgres>,
    code: &str,
    subtotal: Decimal,
    user: Option<UserUuid>,
    today: Date,
    lock: CouponLock,
) -> Result<CouponValidation, sqlx::Error> {
    let code = normalize_code(code);

    if code.is_empty() {
        return Ok(CouponValidation::Invalid(CouponRejection::NotFound));
    }

    let Some(coupon) = repository
        .find_coupon_by_code(tx, &code, lock == CouponLock::ForRedemption)
        .await?
    else {
        return Ok(CouponValidation::Invalid(CouponRejection::NotFound));
    };

    let usage = repository.count_usages(tx, coupon.uuid, user).await?;

    let validation = coupon
        .terms()
        .evaluate(subtotal, usage, today)
        .map(|discount| AppliedCoupon {
            uuid: coupon.uuid,
            code: coupon.code.clone(),
            discount,
        });

    Ok(validation.into())
}
