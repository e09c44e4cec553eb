use clap::Args;
use nutbasket_app::domain::orders::{
    OrdersService,
    records::{OrderDetails, OrderUuid},
};

use crate::cli::StoreArgs;

#[derive(Debug, Args)]
pub(crate) struct ShowOrderArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Order UUID or order number (ORD-YYYYMMDD-XXXXXX)
    order: String,
}

pub(crate) async fn run(args: ShowOrderArgs) -> Result<(), String> {
    let context = args.store.connect().await?;

    let details = find_order(context.orders.as_ref(), &args.order).await?;
    let order = &details.order;

    println!("order_uuid: {}", order.uuid);
    println!("order_number: {}", order.order_number);
    if let Some(user) = order.user_uuid {
        println!("user_uuid: {user}");
    }
    println!("order_status: {}", order.order_status);
    println!("payment_status: {}", order.payment_status);
    println!("payment_method: {}", order.payment_method);
    println!("subtotal: {}", order.subtotal);
    println!("tax_amount: {}", order.tax_amount);
    println!("shipping_amount: {}", order.shipping_amount);
    println!("discount_amount: {}", order.discount_amount);
    println!("total_amount: {}", order.total_amount);
    if let Some(tracking_number) = &order.tracking_number {
        println!("tracking_number: {tracking_number}");
    }
    println!("created_at: {}", order.created_at);

    for item in &details.items {
        println!(
            "item: {} x{} @ {} = {}",
            item.product_name, item.quantity, item.price, item.total
        );
    }

    Ok(())
}

/// Look an order up by UUID, falling back to its order number.
async fn find_order(orders: &dyn OrdersService, reference: &str) -> Result<OrderDetails, String> {
    let result = match reference.parse::<OrderUuid>() {
        Ok(uuid) => orders.get_order(uuid).await,
        Err(_) => orders.get_order_by_number(reference).await,
    };

    result.map_err(|error| format!("failed to load order {reference}: {error}"))
}
