//! Coupon Data

use jiff::civil::Date;
use nutbasket::coupons::{CouponStatus, DiscountType};
use rust_decimal::Decimal;

use crate::domain::coupons::records::CouponUuid;

/// New Coupon Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
    pub uuid: CouponUuid,
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub max_discount_amount: Option<Decimal>,
    pub min_order_amount: Decimal,
    pub valid_from: Option<Date>,
    pub valid_to: Option<Date>,
    pub usage_limit: Option<u32>,
    pub user_limit: Option<u32>,
    pub status: CouponStatus,
}
