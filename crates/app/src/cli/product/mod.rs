use clap::{Args, Subcommand};

mod low_stock;

#[derive(Debug, Args)]
pub(crate) struct ProductCommand {
    #[command(subcommand)]
    command: ProductSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProductSubcommand {
    /// List active products at or below their low-stock threshold
    LowStock(low_stock::LowStockArgs),
}

pub(crate) async fn run(command: ProductCommand) -> Result<(), String> {
    match command.command {
        ProductSubcommand::LowStock(args) => low_stock::run(args).await,
    }
}
