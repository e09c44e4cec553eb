//! Order Data

use nutbasket::orders::{OrderStatus, PaymentStatus};

use crate::domain::{addresses::records::AddressUuid, carts::data::CartOwner};

/// What to do when the shopper's coupon no longer applies at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CouponPolicy {
    /// Refuse to place the order.
    #[default]
    Require,

    /// Place the order at full price and report why the coupon was dropped.
    DropIfInvalid,
}

/// Checkout Request
///
/// The ordering user, if any, is the cart owner; session carts check out as guests.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub owner: CartOwner,
    pub address: AddressUuid,
    pub coupon_code: Option<String>,
    pub coupon_policy: CouponPolicy,
    pub payment_method: String,
    pub notes: Option<String>,
}

/// Order Status Update
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderStatusUpdate {
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
}

impl OrderStatusUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order_status.is_none()
            && self.payment_status.is_none()
            && self.tracking_number.is_none()
            && self.tracking_url.is_none()
    }
}
