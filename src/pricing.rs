//! Cart pricing and order-total computation.
//!
//! Implemented once and shared: the cart store's live totals and the
//! checkout snapshot totals go through the same functions, so an order's
//! `totalAmount` always equals the recomputation over its captured lines.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::value_objects::{Money, Sale};

/// Sale-adjusted unit price: `price - price * sale / 100` when a sale is
/// active, the base price otherwise.
pub fn effective_price(price: Money, sale: Sale) -> Money {
    if sale.is_active() {
        let discount = price.amount() * Decimal::from(sale.percent()) / Decimal::from(100u32);
        Money::new(price.amount() - discount)
    } else {
        price
    }
}

/// Some quantity of one product at a unit price with an optional sale.
pub trait PricedLine {
    fn unit_price(&self) -> Money;
    fn sale(&self) -> Sale;
    fn quantity(&self) -> u32;

    fn effective_price(&self) -> Money {
        effective_price(self.unit_price(), self.sale())
    }
}

/// Aggregate totals over a collection of lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_quantity: u32,
    pub total_amount: Money,
}

/// Single pass over the lines, accumulating at full precision. Rounding is
/// left to presentation.
pub fn totals<'a, L, I>(lines: I) -> Totals
where
    L: PricedLine + 'a,
    I: IntoIterator<Item = &'a L>,
{
    lines.into_iter().fold(Totals::default(), |acc, line| Totals {
        total_quantity: acc.total_quantity + line.quantity(),
        total_amount: acc.total_amount.add(line.effective_price().multiply(line.quantity())),
    })
}
