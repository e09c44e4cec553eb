use clap::Args;
use jiff::{Zoned, civil::Date};
use nutbasket_app::domain::{
    coupons::{CouponsService, records::CouponValidation},
    users::UserUuid,
};
use rust_decimal::Decimal;

use crate::cli::StoreArgs;

#[derive(Debug, Args)]
pub(crate) struct CheckCouponArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Code to check
    #[arg(long)]
    code: String,

    /// Cart subtotal to check against
    #[arg(long)]
    subtotal: Decimal,

    /// Shopper UUID; per-user limits are skipped when omitted
    #[arg(long)]
    user: Option<UserUuid>,

    /// Day to check on (YYYY-MM-DD); defaults to today
    #[arg(long)]
    on: Option<Date>,
}

pub(crate) async fn run(args: CheckCouponArgs) -> Result<(), String> {
    let today = args.on.unwrap_or_else(|| Zoned::now().date());
    let context = args.store.connect().await?;

    let report = check(
        context.coupons.as_ref(),
        &args.code,
        args.subtotal,
        args.user,
        today,
    )
    .await?;

    for line in report {
        println!("{line}");
    }

    Ok(())
}

async fn check(
    coupons: &dyn CouponsService,
    code: &str,
    subtotal: Decimal,
    user: Option<UserUuid>,
    today: Date,
) -> Result<Vec<String>, String> {
    let validation = coupons
        .validate_coupon(code, subtotal, user, today)
        .await
        .map_err(|error| format!("failed to check coupon: {error}"))?;

    let mut report = vec![format!("message: {}", validation.message())];

    if let CouponValidation::Valid(applied) = &validation {
        report.push(format!("coupon_uuid: {}", applied.uuid));

        if let Some(amount) = applied.discount.amount_for(subtotal) {
            report.push(format!(
                "discount_amount: {}",
                amount.clamp(Decimal::ZERO, subtotal)
            ));
        }
    }

    Ok(report)
}
