//! Coupon Records

use jiff::{Timestamp, civil::Date};
use nutbasket::coupons::{
    CouponDiscount, CouponRejection, CouponStatus, CouponTerms, DiscountType,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::uuids::TypedUuid;

/// Coupon UUID
pub type CouponUuid = TypedUuid<CouponRecord>;

/// Coupon Record
#[derive(Debug, Clone, Serialize)]
pub struct CouponRecord {
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
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CouponRecord {
    #[must_use]
    pub fn terms(&self) -> CouponTerms {
        CouponTerms {
            discount_type: self.discount_type,
            discount_value: self.discount_value,
            max_discount_amount: self.max_discount_amount,
            min_order_amount: self.min_order_amount,
            valid_from: self.valid_from,
            valid_to: self.valid_to,
            usage_limit: self.usage_limit,
            user_limit: self.user_limit,
            status: self.status,
        }
    }
}

/// A coupon with how many times it has been redeemed.
#[derive(Debug, Clone, Serialize)]
pub struct CouponSummary {
    #[serde(flatten)]
    pub coupon: CouponRecord,
    pub times_used: u64,
}

/// A coupon that passed every check for a given cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedCoupon {
    pub uuid: CouponUuid,
    pub code: String,
    pub discount: CouponDiscount,
}

/// Result of checking a code against a cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", content = "coupon", rename_all = "snake_case")]
pub enum CouponValidation {
    Valid(AppliedCoupon),
    Invalid(CouponRejection),
}

impl CouponValidation {
    /// Text shown to the shopper.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Valid(_) => "Coupon applied.".to_string(),
            Self::Invalid(rejection) => rejection.to_string(),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

impl From<Result<AppliedCoupon, CouponRejection>> for CouponValidation {
    fn from(result: Result<AppliedCoupon, CouponRejection>) -> Self {
        match result {
            Ok(applied) => Self::Valid(applied),
            Err(rejection) => Self::Invalid(rejection),
        }
    }
}
