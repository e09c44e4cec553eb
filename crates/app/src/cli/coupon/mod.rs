use clap::{Args, Subcommand};

mod check;
mod create;
mod list;

#[derive(Debug, Args)]
pub(crate) struct CouponCommand {
    #[command(subcommand)]
    command: CouponSubcommand,
}

#[derive(Debug, Subcommand)]
enum CouponSubcommand {
    /// Create a coupon
    Create(create::CreateCouponArgs),

    /// Check whether a code would apply to a subtotal
    Check(check::CheckCouponArgs),

    /// List coupons with their redemption counts
    List(list::ListCouponsArgs),
}

pub(crate) async fn run(command: CouponCommand) -> Result<(), String> {
    match command.command {
        CouponSubcommand::Create(args) => create::run(args).await,
        CouponSubcommand::Check(args) => check::run(args).await,
        CouponSubcommand::List(args) => list::run(args).await,
    }
}
