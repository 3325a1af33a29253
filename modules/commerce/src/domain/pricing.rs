//! Money arithmetic shared by the cart and coupon services.
//!
//! Every helper returns `None` when the result leaves the `Decimal` range.

use rust_decimal::Decimal;

pub fn line_total(quantity: i32, unit_price: Decimal) -> Option<Decimal> {
    Decimal::from(quantity).checked_mul(unit_price)
}

/// Sum of `quantity * unit_price` over `(quantity, unit_price)` lines.
pub fn cart_total<I>(lines: I) -> Option<Decimal>
where
    I: IntoIterator<Item = (i32, Decimal)>,
{
    lines.into_iter().try_fold(Decimal::ZERO, |acc, (qty, price)| {
        acc.checked_add(line_total(qty, price)?)
    })
}

/// `total * (100 - percent) / 100`. Percentages above 100 yield a negative amount.
pub fn percent_discount(total: Decimal, percent: Decimal) -> Option<Decimal> {
    Decimal::ONE_HUNDRED
        .checked_sub(percent)
        .and_then(|keep| total.checked_mul(keep))
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
}
