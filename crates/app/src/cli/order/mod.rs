use clap::{Args, Subcommand};

mod show;
mod status;

#[derive(Debug, Args)]
pub(crate) struct OrderCommand {
    #[command(subcommand)]
    command: OrderSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrderSubcommand {
    /// Print an order and its items
    Show(show::ShowOrderArgs),

    /// Change an order's status, payment status or tracking details
    Status(status::OrderStatusArgs),
}

pub(crate) async fn run(command: OrderCommand) -> Result<(), String> {
    match command.command {
        OrderSubcommand::Show(args) => show::run(args).await,
        OrderSubcommand::Status(args) => status::run(args).await,
    }
}
