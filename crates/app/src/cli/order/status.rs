use clap::Args;
use nutbasket::orders::{OrderStatus, PaymentStatus};
use nutbasket_app::domain::orders::{
    OrdersService,
    data::OrderStatusUpdate,
    records::{OrderRecord, OrderUuid},
};

use crate::cli::StoreArgs;

#[derive(Debug, Args)]
pub(crate) struct OrderStatusArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Order UUID
    #[arg(long)]
    order: OrderUuid,

    /// New order status (pending, processing, shipped, delivered, cancelled)
    #[arg(long)]
    status: Option<OrderStatus>,

    /// New payment status (pending, paid, failed, refunded)
    #[arg(long)]
    payment: Option<PaymentStatus>,

    /// Courier tracking number
    #[arg(long)]
    tracking_number: Option<String>,

    /// Courier tracking URL
    #[arg(long)]
    tracking_url: Option<String>,
}

impl OrderStatusArgs {
    fn update(&self) -> OrderStatusUpdate {
        OrderStatusUpdate {
            order_status: self.status,
            payment_status: self.payment,
            tracking_number: self.tracking_number.clone(),
            tracking_url: self.tracking_url.clone(),
        }
    }
}

pub(crate) async fn run(args: OrderStatusArgs) -> Result<(), String> {
    let update = args.update();
    let order = args.order;
    let context = args.store.connect().await?;

    let updated = apply(context.orders.as_ref(), order, update).await?;

    println!("order_uuid: {}", updated.uuid);
    println!("order_number: {}", updated.order_number);
    println!("order_status: {}", updated.order_status);
    println!("payment_status: {}", updated.payment_status);
    if let Some(tracking_number) = &updated.tracking_number {
        println!("tracking_number: {tracking_number}");
    }
    if let Some(tracking_url) = &updated.tracking_url {
        println!("tracking_url: {tracking_url}");
    }
    println!("stock_restored: {}", updated.stock_restored);

    Ok(())
}

async fn apply(
    orders: &dyn OrdersService,
    order: OrderUuid,
    update: OrderStatusUpdate,
) -> Result<OrderRecord, String> {
    if update.is_empty() {
        return Err(
            "nothing to change: pass --status, --payment, --tracking-number or --tracking-url"
                .to_string(),
        );
    }

    orders
        .update_order_status(order, update)
        .await
        .map_err(|error| format!("failed to update order {order}: {error}"))
}

#[cfg(test)]
mod tests {
    use nutbasket_app::domain::orders::{MockOrdersService, OrdersServiceError};

    use super::*;

    #[tokio::test]
    async fn empty_update_never_reaches_the_service() {
        let mut orders = MockOrdersService::new();
        orders.expect_update_order_status().never();

        let result = apply(&orders, OrderUuid::new(), OrderStatusUpdate::default()).await;

        assert!(result.is_err(), "expected an error, got {result:?}");
    }

    #[tokio::test]
    async fn cancellation_is_forwarded_as_given() {
        let order = OrderUuid::new();
        let mut orders = MockOrdersService::new();

        orders
            .expect_update_order_status()
            .once()
            .withf(move |uuid, update| {
                *uuid == order
                    && update.order_status == Some(OrderStatus::Cancelled)
                    && update.payment_status.is_none()
            })
            .return_once(|_, _| Err(OrdersServiceError::NotFound));

        let result = apply(
            &orders,
            order,
            OrderStatusUpdate {
                order_status: Some(OrderStatus::Cancelled),
                ..OrderStatusUpdate::default()
            },
        )
        .await;

        assert_eq!(
            result.err(),
            Some(format!("failed to update order {order}: order not found"))
        );
    }
}
