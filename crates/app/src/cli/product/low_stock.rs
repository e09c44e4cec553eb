use clap::Args;
use nutbasket_app::domain::products::ProductsService;

use crate::cli::StoreArgs;

#[derive(Debug, Args)]
pub(crate) struct LowStockArgs {
    #[command(flatten)]
    store: StoreArgs,
}

pub(crate) async fn run(args: LowStockArgs) -> Result<(), String> {
    let context = args.store.connect().await?;

    let products = context
        .products
        .list_low_stock()
        .await
        .map_err(|error| format!("failed to list low-stock products: {error}"))?;

    if products.is_empty() {
        println!("no products are low on stock");
        return Ok(());
    }

    for product in products {
        println!(
            "{}\t{}\t{} left (threshold {})",
            product.uuid, product.slug, product.stock_quantity, product.low_stock_threshold
        );
    }

    Ok(())
}
