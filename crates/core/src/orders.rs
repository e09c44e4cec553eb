//! Order Status

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::variants::UnknownVariant;

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, not yet picked up by the warehouse.
    Pending,

    /// Being packed.
    Processing,

    /// Handed to the courier.
    Shipped,

    /// Received by the customer.
    Delivered,

    /// Called off; stock goes back on the shelf.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in fulfilment order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("order status", s))
    }
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting payment.
    Pending,

    /// Settled.
    Paid,

    /// Declined or errored.
    Failed,

    /// Returned to the customer.
    Refunded,
}

impl PaymentStatus {
    /// Every status.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Paid, Self::Failed, Self::Refunded];

    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("payment status", s))
    }
}

/// What a status change does to product stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    /// Stock is untouched.
    None,

    /// Every item's quantity goes back to its product.
    Restore,
}

/// Decide the stock effect of moving an order from `from` to `to`.
///
/// Stock is restored at most once per order: only on entering `Cancelled` from another status,
/// and only if it has not been restored before. Leaving `Cancelled` never restores.
#[must_use]
pub fn stock_effect(from: OrderStatus, to: OrderStatus, already_restored: bool) -> StockEffect {
    if to == OrderStatus::Cancelled && from != OrderStatus::Cancelled && !already_restored {
        StockEffect::Restore
    } else {
        StockEffect::None
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn cancelling_an_open_order_restores_stock() {
        for from in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            assert_eq!(
                stock_effect(from, OrderStatus::Cancelled, false),
                StockEffect::Restore,
                "cancelling from {from} should restore"
            );
        }
    }

    #[test]
    fn cancelling_twice_restores_once() {
        assert_eq!(
            stock_effect(OrderStatus::Cancelled, OrderStatus::Cancelled, true),
            StockEffect::None
        );
        assert_eq!(
            stock_effect(OrderStatus::Cancelled, OrderStatus::Cancelled, false),
            StockEffect::None
        );
    }

    #[test]
    fn reopening_and_cancelling_again_does_not_restore() {
        assert_eq!(
            stock_effect(OrderStatus::Cancelled, OrderStatus::Pending, true),
            StockEffect::None
        );
        assert_eq!(
            stock_effect(OrderStatus::Pending, OrderStatus::Cancelled, true),
            StockEffect::None
        );
    }

    #[test]
    fn other_transitions_leave_stock_alone() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                if to == OrderStatus::Cancelled {
                    continue;
                }

                assert_eq!(
                    stock_effect(from, to, false),
                    StockEffect::None,
                    "{from} -> {to} should not touch stock"
                );
            }
        }
    }

    #[test]
    fn statuses_parse_from_storage() -> TestResult {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>()?, status);
        }

        assert_eq!("refunded".parse::<PaymentStatus>()?, PaymentStatus::Refunded);
        assert!("lost".parse::<OrderStatus>().is_err());

        Ok(())
    }
}
