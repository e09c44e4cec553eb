//! Cart Aggregation

use rust_decimal::Decimal;
use thiserror::Error;

/// Anything that contributes `unit_price × quantity` to a cart subtotal.
pub trait Priced {
    /// Current unit price.
    fn unit_price(&self) -> Decimal;

    /// Number of units.
    fn quantity(&self) -> u32;

    /// `unit_price × quantity`.
    fn line_total(&self) -> Decimal {
        line_total(self.unit_price(), self.quantity())
    }
}

/// Calculate the total of a single line.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Sum the line totals of `lines`. An empty cart sums to zero.
pub fn subtotal<'a, T, I>(lines: I) -> Decimal
where
    T: Priced + 'a,
    I: IntoIterator<Item = &'a T>,
{
    lines
        .into_iter()
        .fold(Decimal::ZERO, |acc, line| acc + line.line_total())
}

/// Reasons a requested quantity cannot be placed in a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuantityError {
    /// Zero or negative quantities are removals, not updates.
    #[error("quantity must be at least 1")]
    NotPositive,

    /// More units than the product has in stock.
    #[error("only {available} in stock")]
    ExceedsStock {
        /// Units currently in stock.
        available: u32,
    },
}

/// Check a requested quantity against the stock on hand.
///
/// # Errors
///
/// - [`QuantityError::NotPositive`]: `requested` is zero or negative.
/// - [`QuantityError::ExceedsStock`]: `requested` is more than `available`.
pub fn check_quantity(requested: i64, available: u32) -> Result<u32, QuantityError> {
    let Ok(requested) = u32::try_from(requested) else {
        return Err(if requested <= 0 {
            QuantityError::NotPositive
        } else {
            QuantityError::ExceedsStock { available }
        });
    };

    if requested == 0 {
        return Err(QuantityError::NotPositive);
    }

    if requested > available {
        return Err(QuantityError::ExceedsStock { available });
    }

    Ok(requested)
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    struct Line(Decimal, u32);

    impl Priced for Line {
        fn unit_price(&self) -> Decimal {
            self.0
        }

        fn quantity(&self) -> u32 {
            self.1
        }
    }

    #[test]
    fn subtotal_sums_price_times_quantity() {
        let lines = [Line(dec!(249.50), 2), Line(dec!(120.00), 1)];

        assert_eq!(subtotal(&lines), dec!(619.00));
    }

    #[test]
    fn empty_cart_subtotal_is_zero() {
        let lines: [Line; 0] = [];

        assert_eq!(subtotal(&lines), Decimal::ZERO);
    }

    #[test]
    fn check_quantity_rejects_non_positive() {
        assert_eq!(check_quantity(0, 10), Err(QuantityError::NotPositive));
        assert_eq!(check_quantity(-3, 10), Err(QuantityError::NotPositive));
    }

    #[test]
    fn check_quantity_rejects_more_than_stock() {
        assert_eq!(
            check_quantity(11, 10),
            Err(QuantityError::ExceedsStock { available: 10 })
        );
        assert_eq!(
            check_quantity(i64::MAX, 10),
            Err(QuantityError::ExceedsStock { available: 10 })
        );
    }

    #[test]
    fn check_quantity_accepts_exact_stock() {
        assert_eq!(check_quantity(10, 10), Ok(10));
    }
}
