//! Pricing

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    coupons::CouponDiscount,
    money::{percent_of, round_money},
};

/// Store-wide pricing parameters, supplied by the settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Tax rate as a percentage of the subtotal, e.g. `18` for 18%.
    pub tax_rate: Decimal,

    /// Flat shipping charge for orders below the free shipping threshold.
    pub shipping_flat: Decimal,

    /// Subtotal at or above which shipping is free.
    pub free_shipping_threshold: Decimal,
}

/// Order totals.
///
/// `total_amount` is always `subtotal + tax_amount + shipping_amount - discount_amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line totals.
    pub subtotal: Decimal,

    /// Tax on the subtotal.
    pub tax_amount: Decimal,

    /// Shipping charge.
    pub shipping_amount: Decimal,

    /// Coupon discount, never more than the subtotal.
    pub discount_amount: Decimal,

    /// Amount payable.
    pub total_amount: Decimal,
}

/// Errors that can occur while computing order totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PricingError {
    /// The subtotal was negative.
    #[error("subtotal cannot be negative")]
    NegativeSubtotal,

    /// A pricing setting was negative.
    #[error("pricing setting `{0}` cannot be negative")]
    NegativeSetting(&'static str),

    /// Arithmetic overflowed the decimal range.
    #[error("amount overflowed while computing totals")]
    Overflow,
}

/// Compute tax, shipping, discount and total for a subtotal.
///
/// Tax and percentage discounts are rounded to cents. A discount larger than the subtotal is
/// reduced to the subtotal, so the total can never go negative.
///
/// # Errors
///
/// - [`PricingError::NegativeSubtotal`]: `subtotal` is below zero.
/// - [`PricingError::NegativeSetting`]: a rate or amount in `settings` is below zero.
/// - [`PricingError::Overflow`]: an intermediate value does not fit in a `Decimal`.
pub fn compute_totals(
    subtotal: Decimal,
    settings: &PricingSettings,
    discount: Option<&CouponDiscount>,
) -> Result<Totals, PricingError> {
    if subtotal < Decimal::ZERO {
        return Err(PricingError::NegativeSubtotal);
    }

    check_setting("tax_rate", settings.tax_rate)?;
    check_setting("shipping_amount", settings.shipping_flat)?;
    check_setting("free_shipping_amount", settings.free_shipping_threshold)?;

    let subtotal = round_money(subtotal);

    let tax_amount = percent_of(subtotal, settings.tax_rate).ok_or(PricingError::Overflow)?;

    let shipping_amount = if subtotal >= settings.free_shipping_threshold {
        Decimal::ZERO
    } else {
        round_money(settings.shipping_flat)
    };

    let discount_amount = match discount {
        Some(discount) => discount
            .amount_for(subtotal)
            .ok_or(PricingError::Overflow)?
            .clamp(Decimal::ZERO, subtotal),
        None => Decimal::ZERO,
    };

    let total_amount = subtotal
        .checked_add(tax_amount)
        .and_then(|amount| amount.checked_add(shipping_amount))
        .and_then(|amount| amount.checked_sub(discount_amount))
        .ok_or(PricingError::Overflow)?;

    Ok(Totals {
        subtotal,
        tax_amount,
        shipping_amount,
        discount_amount,
        total_amount,
    })
}

fn check_setting(name: &'static str, value: Decimal) -> Result<(), PricingError> {
    if value < Decimal::ZERO {
        return Err(PricingError::NegativeSetting(name));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;
    use testresult::TestResult;

    use crate::coupons::DiscountType;

    use super::*;

    fn settings() -> PricingSettings {
        PricingSettings {
            tax_rate: dec!(18),
            shipping_flat: dec!(50),
            free_shipping_threshold: dec!(500),
        }
    }

    fn percentage(value: Decimal, max_discount: Option<Decimal>) -> CouponDiscount {
        CouponDiscount {
            discount_type: DiscountType::Percentage,
            value,
            max_discount,
        }
    }

    fn fixed(value: Decimal) -> CouponDiscount {
        CouponDiscount {
            discount_type: DiscountType::Fixed,
            value,
            max_discount: None,
        }
    }

    #[test]
    fn large_order_without_coupon_ships_free() -> TestResult {
        let totals = compute_totals(dec!(1000), &settings(), None)?;

        assert_eq!(totals.tax_amount, dec!(180.00));
        assert_eq!(totals.shipping_amount, Decimal::ZERO);
        assert_eq!(totals.discount_amount, Decimal::ZERO);
        assert_eq!(totals.total_amount, dec!(1180.00));

        Ok(())
    }

    #[test]
    fn percentage_coupon_is_clamped_to_max_discount() -> TestResult {
        let coupon = percentage(dec!(10), Some(dec!(20)));

        let totals = compute_totals(dec!(300), &settings(), Some(&coupon))?;

        assert_eq!(totals.tax_amount, dec!(54.00));
        assert_eq!(totals.shipping_amount, dec!(50));
        assert_eq!(totals.discount_amount, dec!(20.00));
        assert_eq!(totals.total_amount, dec!(384.00));

        Ok(())
    }

    #[test]
    fn subtotal_at_threshold_ships_free() -> TestResult {
        let totals = compute_totals(dec!(500), &settings(), None)?;

        assert_eq!(totals.shipping_amount, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn shipping_is_zero_whenever_subtotal_reaches_threshold() -> TestResult {
        for subtotal in [dec!(500), dec!(500.01), dec!(750), dec!(12345.67)] {
            let totals = compute_totals(subtotal, &settings(), None)?;

            assert_eq!(
                totals.shipping_amount,
                Decimal::ZERO,
                "subtotal {subtotal} should ship free"
            );
        }

        Ok(())
    }

    #[test]
    fn capped_discount_never_exceeds_max() -> TestResult {
        let coupon = percentage(dec!(35), Some(dec!(99.99)));

        for subtotal in [dec!(10), dec!(285.70), dec!(285.72), dec!(1000), dec!(99999)] {
            let totals = compute_totals(subtotal, &settings(), Some(&coupon))?;

            assert!(
                totals.discount_amount <= dec!(99.99),
                "discount {} exceeds cap for subtotal {subtotal}",
                totals.discount_amount
            );
        }

        Ok(())
    }

    #[test]
    fn total_identity_holds() -> TestResult {
        let coupons = [
            None,
            Some(percentage(dec!(12.5), None)),
            Some(fixed(dec!(40))),
        ];

        for subtotal in [dec!(0.99), dec!(133.33), dec!(499.99), dec!(2500)] {
            for coupon in &coupons {
                let totals = compute_totals(subtotal, &settings(), coupon.as_ref())?;

                assert_eq!(
                    totals.total_amount,
                    totals.subtotal + totals.tax_amount + totals.shipping_amount
                        - totals.discount_amount,
                    "identity broken for subtotal {subtotal}"
                );
            }
        }

        Ok(())
    }

    #[test]
    fn fixed_discount_is_capped_at_subtotal() -> TestResult {
        let coupon = fixed(dec!(500));

        let totals = compute_totals(dec!(120), &settings(), Some(&coupon))?;

        assert_eq!(totals.discount_amount, dec!(120));
        assert_eq!(totals.total_amount, dec!(21.60) + dec!(50));
        assert!(totals.total_amount >= Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn tax_is_rounded_to_cents() -> TestResult {
        let totals = compute_totals(dec!(19.99), &settings(), None)?;

        assert_eq!(totals.tax_amount, dec!(3.60));

        Ok(())
    }

    #[test]
    fn zero_threshold_means_free_shipping() -> TestResult {
        let settings = PricingSettings {
            free_shipping_threshold: Decimal::ZERO,
            ..settings()
        };

        let totals = compute_totals(dec!(1), &settings, None)?;

        assert_eq!(totals.shipping_amount, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn negative_inputs_are_rejected() {
        assert_eq!(
            compute_totals(dec!(-1), &settings(), None),
            Err(PricingError::NegativeSubtotal)
        );

        let settings = PricingSettings {
            tax_rate: dec!(-5),
            ..settings()
        };

        assert_eq!(
            compute_totals(dec!(10), &settings, None),
            Err(PricingError::NegativeSetting("tax_rate"))
        );
    }
}
