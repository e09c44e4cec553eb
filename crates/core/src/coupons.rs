//! Coupons
//!
//! Coupon terms are evaluated against a cart subtotal, the coupon's usage so far, and the current
//! date. Evaluation never computes the discount amount; that is left to
//! [`compute_totals`](crate::pricing::compute_totals).

use std::{fmt, str::FromStr};

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    money::{percent_of, round_money},
    variants::UnknownVariant,
};

/// How a coupon's `discount_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `discount_value` is a percentage of the subtotal.
    Percentage,

    /// `discount_value` is a fixed amount of money.
    Fixed,
}

impl DiscountType {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(Self::Percentage),
            "fixed" => Ok(Self::Fixed),
            other => Err(UnknownVariant::new("discount type", other)),
        }
    }
}

/// Whether a coupon may be redeemed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponStatus {
    /// Redeemable, subject to its other terms.
    Active,

    /// Switched off by an administrator.
    Inactive,
}

impl CouponStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for CouponStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CouponStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(UnknownVariant::new("coupon status", other)),
        }
    }
}

/// Why a coupon cannot be applied. The display text is shown to shoppers verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponRejection {
    /// No coupon has this code.
    #[error("Coupon not found.")]
    NotFound,

    /// The coupon has been switched off.
    #[error("Coupon is inactive.")]
    Inactive,

    /// Today is before `valid_from`.
    #[error("Coupon not yet active.")]
    NotYetActive,

    /// Today is after `valid_to`.
    #[error("Coupon has expired.")]
    Expired,

    /// The cart subtotal is below `min_order_amount`.
    #[error("Minimum order amount not met.")]
    MinimumNotMet,

    /// Redemptions across all shoppers reached `usage_limit`.
    #[error("Coupon usage limit reached.")]
    UsageLimitReached,

    /// This shopper's redemptions reached `user_limit`.
    #[error("You have already used this coupon.")]
    UserLimitReached,
}

/// How often a coupon has been redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CouponUsage {
    /// Redemptions across all shoppers.
    pub total: u64,

    /// Redemptions by the shopper checking out; `None` for guests.
    pub by_user: Option<u64>,
}

/// The discount a valid coupon grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponDiscount {
    /// How `value` is interpreted.
    pub discount_type: DiscountType,

    /// Percentage or fixed amount.
    pub value: Decimal,

    /// Upper bound for percentage discounts.
    pub max_discount: Option<Decimal>,
}

impl CouponDiscount {
    /// Discount granted on `subtotal`, before it is capped at the subtotal itself.
    ///
    /// Returns `None` when the percentage calculation overflows.
    #[must_use]
    pub fn amount_for(&self, subtotal: Decimal) -> Option<Decimal> {
        match self.discount_type {
            DiscountType::Percentage => {
                let discount = percent_of(subtotal, self.value)?;

                Some(match self.max_discount {
                    Some(max) if discount > max => round_money(max),
                    _ => discount,
                })
            }
            DiscountType::Fixed => Some(round_money(self.value)),
        }
    }
}

/// The redemption terms of a coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponTerms {
    /// How `discount_value` is interpreted.
    pub discount_type: DiscountType,

    /// Percentage or fixed amount.
    pub discount_value: Decimal,

    /// Cap for percentage discounts; ignored for fixed discounts.
    pub max_discount_amount: Option<Decimal>,

    /// Smallest subtotal the coupon applies to.
    pub min_order_amount: Decimal,

    /// First day the coupon may be used.
    pub valid_from: Option<Date>,

    /// Last day the coupon may be used.
    pub valid_to: Option<Date>,

    /// Redemptions allowed across all shoppers; `None` is unlimited.
    pub usage_limit: Option<u32>,

    /// Redemptions allowed per shopper; `None` is unlimited.
    pub user_limit: Option<u32>,

    /// Administrative switch.
    pub status: CouponStatus,
}

impl CouponTerms {
    /// A coupon is expired once `valid_to` has passed, whatever its status.
    #[must_use]
    pub fn is_expired(&self, today: Date) -> bool {
        self.valid_to.is_some_and(|valid_to| valid_to < today)
    }

    /// The discount these terms grant, without checking whether they apply.
    #[must_use]
    pub fn discount(&self) -> CouponDiscount {
        CouponDiscount {
            discount_type: self.discount_type,
            value: self.discount_value,
            max_discount: match self.discount_type {
                DiscountType::Percentage => self.max_discount_amount,
                DiscountType::Fixed => None,
            },
        }
    }

    /// Check the terms against a cart. The first failing rule wins.
    ///
    /// # Errors
    ///
    /// Returns the [`CouponRejection`] of the first rule that fails, in this order: status,
    /// start date, end date, minimum order amount, total usage limit, per-user limit.
    pub fn evaluate(
        &self,
        subtotal: Decimal,
        usage: CouponUsage,
        today: Date,
    ) -> Result<CouponDiscount, CouponRejection> {
        if self.status != CouponStatus::Active {
            return Err(CouponRejection::Inactive);
        }

        if self.valid_from.is_some_and(|valid_from| today < valid_from) {
            return Err(CouponRejection::NotYetActive);
        }

        if self.is_expired(today) {
            return Err(CouponRejection::Expired);
        }

        if subtotal < self.min_order_amount {
            return Err(CouponRejection::MinimumNotMet);
        }

        if self
            .usage_limit
            .is_some_and(|limit| usage.total >= u64::from(limit))
        {
            return Err(CouponRejection::UsageLimitReached);
        }

        if let (Some(limit), Some(used)) = (self.user_limit, usage.by_user)
            && used >= u64::from(limit)
        {
            return Err(CouponRejection::UserLimitReached);
        }

        Ok(self.discount())
    }
}

/// Normalise a shopper-entered code for display and storage.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
