//! Gross margin and gross profit before and after a price change.

use crate::elasticity::Projection;
use crate::rounding::{percent_of, round_half_up};
use crate::EconError;
use promo_core::{MarginInputs, Product};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Margin figures for one product; percentages and currency at 2 dp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginResult {
    pub current_margin_pct: Decimal,
    pub projected_margin_pct: Decimal,
    pub margin_change_pct: Decimal,
    pub gross_profit: Decimal,
    pub projected_gross_profit: Decimal,
    /// Projected margin reaches the advisory target.
    pub meets_target: bool,
    /// Price that yields the target margin at this cost; `None` when unreachable.
    pub target_price: Option<Decimal>,
    /// Markup of the projected price over cost (2 dp).
    pub markup_pct: Decimal,
}

/// `(price - cost) / price * 100`, zero for a non-positive price. May be negative.
fn margin_pct(price: Decimal, cost: Decimal) -> Decimal {
    if price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    price
        .checked_sub(cost)
        .and_then(|m| m.checked_div(price))
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

fn gross_profit(price: Decimal, cost: Decimal, units: u64) -> Decimal {
    price
        .checked_sub(cost)
        .and_then(|m| m.checked_mul(Decimal::from(units)))
        .unwrap_or(Decimal::ZERO)
}

/// Compute margin figures for `product`.
///
/// Uses the projected price and units when a projection exists, otherwise
/// assumes no change. The margin percentages are independent of the
/// elasticity model; only the projected units are borrowed from it.
pub fn compute_margin(
    product: &Product,
    inputs: &MarginInputs,
    projection: Option<&Projection>,
) -> MarginResult {
    let cost = inputs.cost_per_unit;
    let (new_price, new_units) = match projection {
        Some(p) => (p.new_price, p.new_units),
        None => (product.current_price, product.total_units),
    };

    let current = margin_pct(product.current_price, cost);
    let projected = margin_pct(new_price, cost);
    let change = projected.checked_sub(current).unwrap_or(Decimal::ZERO);

    MarginResult {
        current_margin_pct: round_half_up(current, 2),
        projected_margin_pct: round_half_up(projected, 2),
        margin_change_pct: round_half_up(change, 2),
        gross_profit: round_half_up(gross_profit(product.current_price, cost, product.total_units), 2),
        projected_gross_profit: round_half_up(gross_profit(new_price, cost, new_units), 2),
        meets_target: projected >= inputs.target_margin_pct,
        target_price: price_for_target_margin(cost, inputs.target_margin_pct).ok(),
        markup_pct: round_half_up(markup_pct(new_price, cost), 2),
    }
}

/// Price at which `cost` yields `target_pct` gross margin: cost / (1 - target/100).
///
/// Example:
/// assert_eq!(price_for_target_margin(Decimal::new(6, 0), Decimal::new(40, 0)).unwrap(), Decimal::new(10, 0));
pub fn price_for_target_margin(cost: Decimal, target_pct: Decimal) -> Result<Decimal, EconError> {
    if cost < Decimal::ZERO {
        return Err(EconError::InvalidCost);
    }
    if target_pct < Decimal::ZERO || target_pct >= Decimal::ONE_HUNDRED {
        return Err(EconError::UnreachableMargin(target_pct));
    }
    let keep = Decimal::ONE - target_pct / Decimal::ONE_HUNDRED;
    let price = cost.checked_div(keep).ok_or(EconError::Overflow)?;
    Ok(round_half_up(price, 2))
}

/// Markup over cost in percent. Zero when cost is zero.
pub fn markup_pct(price: Decimal, cost: Decimal) -> Decimal {
    percent_of(price - cost, cost)
}
