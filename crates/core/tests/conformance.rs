//! Storefront checkout conformance tests

use jiff::civil::{Date, date};
use nutbasket::{
    carts::{Priced, subtotal},
    coupons::{CouponRejection, CouponStatus, CouponTerms, CouponUsage, DiscountType},
    pricing::{PricingSettings, compute_totals},
};
use rust_decimal::{Decimal, dec};
use testresult::TestResult;

const TODAY: Date = date(2026, 3, 15);

struct Line {
    price: Decimal,
    quantity: u32,
}

impl Priced for Line {
    fn unit_price(&self) -> Decimal {
        self.price
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }
}

fn store_settings() -> PricingSettings {
    PricingSettings {
        tax_rate: dec!(18),
        shipping_flat: dec!(50),
        free_shipping_threshold: dec!(500),
    }
}

fn ten_percent_capped_at_twenty() -> CouponTerms {
    CouponTerms {
        discount_type: DiscountType::Percentage,
        discount_value: dec!(10),
        max_discount_amount: Some(dec!(20)),
        min_order_amount: Decimal::ZERO,
        valid_from: None,
        valid_to: None,
        usage_limit: None,
        user_limit: None,
        status: CouponStatus::Active,
    }
}

#[test]
fn large_cart_without_coupon() -> TestResult {
    let lines = [
        Line {
            price: dec!(250),
            quantity: 2,
        },
        Line {
            price: dec!(125),
            quantity: 4,
        },
    ];

    let totals = compute_totals(subtotal(&lines), &store_settings(), None)?;

    assert_eq!(totals.subtotal, dec!(1000.00));
    assert_eq!(totals.tax_amount, dec!(180.00));
    assert_eq!(totals.shipping_amount, Decimal::ZERO);
    assert_eq!(totals.total_amount, dec!(1180.00));

    Ok(())
}

#[test]
fn small_cart_with_capped_percentage_coupon() -> TestResult {
    let lines = [Line {
        price: dec!(100),
        quantity: 3,
    }];
    let subtotal = subtotal(&lines);

    let discount = ten_percent_capped_at_twenty().evaluate(subtotal, CouponUsage::default(), TODAY)?;
    let totals = compute_totals(subtotal, &store_settings(), Some(&discount))?;

    assert_eq!(totals.tax_amount, dec!(54.00));
    assert_eq!(totals.shipping_amount, dec!(50.00));
    assert_eq!(totals.discount_amount, dec!(20.00));
    assert_eq!(totals.total_amount, dec!(384.00));

    Ok(())
}

#[test]
fn coupon_that_ended_yesterday_is_expired() {
    let terms = CouponTerms {
        valid_to: Some(date(2026, 3, 14)),
        ..ten_percent_capped_at_twenty()
    };

    let result = terms.evaluate(dec!(300), CouponUsage::default(), TODAY);

    assert_eq!(result, Err(CouponRejection::Expired));
    assert_eq!(CouponRejection::Expired.to_string(), "Coupon has expired.");
}
