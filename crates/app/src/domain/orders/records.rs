//! Order Records

use jiff::Timestamp;
use nutbasket::{
    coupons::CouponRejection,
    order_numbers::OrderNumber,
    orders::{OrderStatus, PaymentStatus},
    pricing::Totals,
};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::{
    domain::{
        addresses::records::AddressUuid,
        coupons::records::{AppliedCoupon, CouponUuid},
        products::records::ProductUuid,
        users::UserUuid,
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Record
#[derive(Debug, Clone, Serialize)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub order_number: OrderNumber,
    pub user_uuid: Option<UserUuid>,
    pub address_uuid: AddressUuid,
    pub coupon_uuid: Option<CouponUuid>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub shipping_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: String,
    pub notes: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub stock_restored: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OrderRecord {
    #[must_use]
    pub fn totals(&self) -> Totals {
        Totals {
            subtotal: self.subtotal,
            tax_amount: self.tax_amount,
            shipping_amount: self.shipping_amount,
            discount_amount: self.discount_amount,
            total_amount: self.total_amount,
        }
    }
}

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItemRecord>;

/// Order Item Record
///
/// `price` and `product_name` are copied from the product when the order is placed and never
/// change afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub order_uuid: OrderUuid,
    pub product_uuid: ProductUuid,
    pub product_name: String,
    pub quantity: u32,
    pub price: Decimal,
    pub total: Decimal,
}

/// An order with its items.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: OrderRecord,
    pub items: Vec<OrderItemRecord>,
}

/// A successfully placed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedOrder {
    pub uuid: OrderUuid,
    pub order_number: OrderNumber,
    pub totals: Totals,
    pub coupon: Option<AppliedCoupon>,

    /// Why the shopper's coupon was left off, under [`CouponPolicy::DropIfInvalid`].
    ///
    /// [`CouponPolicy::DropIfInvalid`]: crate::domain::orders::data::CouponPolicy::DropIfInvalid
    pub dropped_coupon: Option<CouponRejection>,
}

/// Why a checkout was turned down. Nothing is written when a checkout is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CheckoutRejection {
    #[error("Your cart is empty.")]
    EmptyCart,

    #[error("Please choose a payment method.")]
    MissingPaymentMethod,

    #[error("Delivery address not found.")]
    AddressNotFound,

    #[error("{product_name} is no longer available.")]
    ProductUnavailable {
        product: ProductUuid,
        product_name: String,
    },

    #[error("Only {available} left in stock for {product_name}.")]
    InsufficientStock {
        product: ProductUuid,
        product_name: String,
        requested: u32,
        available: u32,
    },

    #[error("{rejection}")]
    Coupon { rejection: CouponRejection },
}

/// Result of a checkout attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", content = "order", rename_all = "snake_case")]
pub enum CheckoutOutcome {
    Placed(PlacedOrder),
    Rejected(CheckoutRejection),
}
