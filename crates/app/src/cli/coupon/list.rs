use clap::Args;
use nutbasket_app::domain::coupons::CouponsService;

use crate::cli::StoreArgs;

#[derive(Debug, Args)]
pub(crate) struct ListCouponsArgs {
    #[command(flatten)]
    store: StoreArgs,
}

pub(crate) async fn run(args: ListCouponsArgs) -> Result<(), String> {
    let context = args.store.connect().await?;

    let coupons = context
        .coupons
        .list_coupons()
        .await
        .map_err(|error| format!("failed to list coupons: {error}"))?;

    if coupons.is_empty() {
        println!("no coupons found");
        return Ok(());
    }

    for summary in coupons {
        let coupon = summary.coupon;
        let limit = coupon
            .usage_limit
            .map_or_else(|| "unlimited".to_string(), |limit| limit.to_string());

        println!(
            "{}\t{}\t{} {}\tused {}/{}",
            coupon.uuid,
            coupon.code,
            coupon.discount_type,
            coupon.discount_value,
            summary.times_used,
            limit
        );
    }

    Ok(())
}
