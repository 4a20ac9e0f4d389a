//! Constant-elasticity price change projection.
//!
//! unit change % = elasticity x price change %, applied to trailing units,
//! then revenue is re-derived at the new price.

use crate::rounding::{percent_of, round_half_up, round_units, unit_delta};
use promo_core::{parse_amount, Product};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Projected demand and revenue for one product at a candidate price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    /// Candidate price the projection was computed for.
    pub new_price: Decimal,
    /// Price change in percent (2 dp).
    pub price_change_pct: Decimal,
    /// Unit change in percent (2 dp).
    pub unit_change_pct: Decimal,
    /// Projected units, rounded, never negative.
    pub new_units: u64,
    /// `new_units - total_units`.
    pub change_in_units: i64,
    /// Projected revenue, rounded to whole currency units.
    pub new_dollars: Decimal,
    /// `new_dollars - total_dollars`.
    pub change_in_dollars: Decimal,
    /// Revenue change in percent of trailing revenue (2 dp).
    pub percent_change_dollars: Decimal,
}

impl Projection {
    /// Projection with no change in units or revenue.
    fn unchanged(product: &Product, new_price: Decimal) -> Self {
        Self {
            new_price,
            price_change_pct: Decimal::ZERO,
            unit_change_pct: Decimal::ZERO,
            new_units: product.total_units,
            change_in_units: 0,
            new_dollars: product.total_dollars,
            change_in_dollars: Decimal::ZERO,
            percent_change_dollars: Decimal::ZERO,
        }
    }
}

/// Project units and revenue for `product` at `new_price`.
///
/// Re-entering the current price returns the trailing figures unchanged, so
/// the deltas are exactly zero even when trailing revenue is not precisely
/// price x units. A non-positive current price defines the price change as 0.
///
/// Example:
/// let p = Product { current_price: 9.45, total_units: 19_919, total_dollars: 188_258, .. };
/// let proj = project_price_change(&p, Decimal::new(10, 0), DEFAULT_ELASTICITY);
/// assert_eq!(proj.new_units, 18_528);
pub fn project_price_change(product: &Product, new_price: Decimal, elasticity: Decimal) -> Projection {
    if new_price == product.current_price {
        return Projection::unchanged(product, new_price);
    }
    match try_project(product, new_price, elasticity) {
        Some(p) => {
            debug!(
                product = %product.id,
                %new_price,
                new_units = p.new_units,
                change_in_dollars = %p.change_in_dollars,
                "projected price change"
            );
            p
        }
        None => {
            warn!(product = %product.id, %new_price, "projection overflowed; reporting no change");
            Projection::unchanged(product, new_price)
        }
    }
}

fn try_project(product: &Product, new_price: Decimal, elasticity: Decimal) -> Option<Projection> {
    let current = product.current_price;
    let price_change_pct = if current > Decimal::ZERO {
        percent_of(new_price.checked_sub(current)?, current)
    } else {
        Decimal::ZERO
    };
    let unit_change_pct = elasticity.checked_mul(price_change_pct)?;

    let units = Decimal::from(product.total_units);
    let factor = Decimal::ONE.checked_add(unit_change_pct.checked_div(Decimal::ONE_HUNDRED)?)?;
    let new_units = round_units(units.checked_mul(factor)?);
    let change_in_units = unit_delta(new_units, product.total_units);

    let new_dollars = round_half_up(Decimal::from(new_units).checked_mul(new_price)?, 0);
    let change_in_dollars = new_dollars.checked_sub(product.total_dollars)?;
    let percent_change_dollars =
        round_half_up(percent_of(change_in_dollars, product.total_dollars), 2);

    Some(Projection {
        new_price,
        price_change_pct: round_half_up(price_change_pct, 2),
        unit_change_pct: round_half_up(unit_change_pct, 2),
        new_units,
        change_in_units,
        new_dollars,
        change_in_dollars,
        percent_change_dollars,
    })
}

/// Parse a raw price field and project it.
///
/// Empty, unparsable or negative text yields `None` (no projection) rather
/// than being read as a price of zero.
pub fn project_raw(product: &Product, raw: &str, elasticity: Decimal) -> Option<Projection> {
    parse_amount(raw).map(|price| project_price_change(product, price, elasticity))
}
