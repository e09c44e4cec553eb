use clap::Args;
use jiff::civil::Date;
use nutbasket::coupons::{CouponStatus, DiscountType};
use nutbasket_app::domain::coupons::{
    CouponsService,
    data::NewCoupon,
    records::CouponUuid,
};
use rust_decimal::Decimal;

use crate::cli::StoreArgs;

#[derive(Debug, Args)]
pub(crate) struct CreateCouponArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Code shoppers enter; stored upper-cased
    #[arg(long)]
    code: String,

    /// Discount type (percentage, fixed)
    #[arg(long = "type")]
    discount_type: DiscountType,

    /// Percentage (0-100) or fixed amount
    #[arg(long)]
    value: Decimal,

    /// Upper bound for percentage discounts
    #[arg(long)]
    max_discount: Option<Decimal>,

    /// Minimum subtotal the coupon applies to
    #[arg(long, default_value_t = Decimal::ZERO)]
    min_order: Decimal,

    /// First day the coupon is valid (YYYY-MM-DD)
    #[arg(long)]
    valid_from: Option<Date>,

    /// Last day the coupon is valid (YYYY-MM-DD)
    #[arg(long)]
    valid_to: Option<Date>,

    /// Total redemptions allowed across all shoppers
    #[arg(long)]
    usage_limit: Option<u32>,

    /// Redemptions allowed per signed-in shopper
    #[arg(long)]
    user_limit: Option<u32>,

    /// Create the coupon switched off
    #[arg(long)]
    inactive: bool,
}

impl CreateCouponArgs {
    fn new_coupon(&self) -> NewCoupon {
        NewCoupon {
            uuid: CouponUuid::new(),
            code: self.code.clone(),
            discount_type: self.discount_type,
            discount_value: self.value,
            max_discount_amount: self.max_discount,
            min_order_amount: self.min_order,
            valid_from: self.valid_from,
            valid_to: self.valid_to,
            usage_limit: self.usage_limit,
            user_limit: self.user_limit,
            status: if self.inactive {
                CouponStatus::Inactive
            } else {
                CouponStatus::Active
            },
        }
    }
}

pub(crate) async fn run(args: CreateCouponArgs) -> Result<(), String> {
    let coupon = args.new_coupon();
    let context = args.store.connect().await?;

    let created = context
        .coupons
        .create_coupon(coupon)
        .await
        .map_err(|error| format!("failed to create coupon: {error}"))?;

    println!("coupon_uuid: {}", created.uuid);
    println!("code: {}", created.code);
    println!("discount_type: {}", created.discount_type);
    println!("discount_value: {}", created.discount_value);
    println!("status: {}", created.status);

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use jiff::civil::date;
    use rust_decimal::dec;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        args: CreateCouponArgs,
    }

    #[test]
    fn flags_map_onto_the_new_coupon() -> TestResult {
        let harness = Harness::try_parse_from([
            "create",
            "--database-url",
            "postgres://localhost/nutbasket",
            "--code",
            "diwali",
            "--type",
            "percentage",
            "--value",
            "10",
            "--max-discount",
            "20",
            "--valid-to",
            "2026-11-15",
            "--user-limit",
            "1",
            "--inactive",
        ])?;

        let coupon = harness.args.new_coupon();

        assert_eq!(coupon.code, "diwali");
        assert_eq!(coupon.discount_type, DiscountType::Percentage);
        assert_eq!(coupon.discount_value, dec!(10));
        assert_eq!(coupon.max_discount_amount, Some(dec!(20)));
        assert_eq!(coupon.min_order_amount, Decimal::ZERO);
        assert_eq!(coupon.valid_from, None);
        assert_eq!(coupon.valid_to, Some(date(2026, 11, 15)));
        assert_eq!(coupon.usage_limit, None);
        assert_eq!(coupon.user_limit, Some(1));
        assert_eq!(coupon.status, CouponStatus::Inactive);

        Ok(())
    }
}
