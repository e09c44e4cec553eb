//! Money

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places monetary values are persisted and displayed with.
pub const MONEY_SCALE: u32 = 2;

/// Round a monetary amount to [`MONEY_SCALE`] places, halves away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Calculate `percent`% of `amount`, rounded to money precision.
///
/// Returns `None` when the intermediate product overflows.
#[must_use]
pub fn percent_of(amount: Decimal, percent: Decimal) -> Option<Decimal> {
    let applied = amount.checked_mul(percent)?;

    applied.checked_div(Decimal::ONE_HUNDRED).map(round_money)
}
