//! Simulation state store: products, candidate prices and margin inputs.

use crate::StoreError;
use promo_core::{
    parse_amount, validate_config, validate_margin_inputs, validate_products, MarginInputs,
    PriceInput, Product, ProductId, SimConfig,
};
use promo_econ::rounding::{percent_of, round_half_up, unit_delta};
use promo_econ::{compute_margin, project_price_change, MarginResult, Projection};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// One product with its candidate price and the projection derived from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub product: Product,
    pub new_price: PriceInput,
    /// `None` while the price field is empty or invalid.
    pub projection: Option<Projection>,
}

impl ProductRow {
    fn fresh(product: Product) -> Self {
        Self {
            product,
            new_price: PriceInput::empty(),
            projection: None,
        }
    }

    /// Units after the candidate price, or current units without one.
    pub fn projected_units(&self) -> u64 {
        self.projection
            .as_ref()
            .map_or(self.product.total_units, |p| p.new_units)
    }

    /// Revenue after the candidate price, or current revenue without one.
    pub fn projected_dollars(&self) -> Decimal {
        self.projection
            .as_ref()
            .map_or(self.product.total_dollars, |p| p.new_dollars)
    }
}

/// Portfolio-level totals across all rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub current_units: u64,
    pub current_dollars: Decimal,
    pub projected_units: u64,
    pub projected_dollars: Decimal,
    pub change_in_units: i64,
    pub change_in_dollars: Decimal,
    /// Revenue change in percent of current revenue (2 dp).
    pub percent_change_dollars: Decimal,
    /// Rows carrying a projection.
    pub projected_rows: usize,
}

/// Owns the product list and recomputes projections on every price edit.
#[derive(Clone, Debug)]
pub struct SimulationStore {
    seed: Vec<Product>,
    config: SimConfig,
    rows: Vec<ProductRow>,
    margins: BTreeMap<ProductId, MarginInputs>,
}

impl SimulationStore {
    /// Validate seed data and configuration, then load fresh rows.
    pub fn from_seed(seed: Vec<Product>, config: SimConfig) -> Result<Self, StoreError> {
        validate_products(&seed)?;
        validate_config(&config)?;
        let rows = seed.iter().cloned().map(ProductRow::fresh).collect();
        info!(products = seed.len(), elasticity = %config.elasticity, "simulation store loaded");
        Ok(Self {
            seed,
            config,
            rows,
            margins: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn rows(&self) -> &[ProductRow] {
        &self.rows
    }

    fn index_of(&self, id: &ProductId) -> Result<usize, StoreError> {
        self.rows
            .iter()
            .position(|r| &r.product.id == id)
            .ok_or_else(|| StoreError::UnknownProduct(id.clone()))
    }

    pub fn row(&self, id: &ProductId) -> Result<&ProductRow, StoreError> {
        let i = self.index_of(id)?;
        Ok(&self.rows[i])
    }

    /// Record a candidate price and recompute that row's projection.
    ///
    /// Empty or invalid text clears the projection.
    pub fn set_new_price(&mut self, id: &ProductId, raw: &str) -> Result<&ProductRow, StoreError> {
        let i = self.index_of(id)?;
        let input = PriceInput::parse(raw);
        if input.is_invalid() {
            warn!(product = %id, raw, "ignoring invalid price input");
        }
        let product = self.rows[i].product.clone();
        let projection = input
            .value()
            .map(|price| project_price_change(&product, price, self.config.elasticity));
        debug!(product = %id, projected = projection.is_some(), "row recomputed");
        self.rows[i] = ProductRow {
            product,
            new_price: input,
            projection,
        };
        Ok(&self.rows[i])
    }

    pub fn clear_new_price(&mut self, id: &ProductId) -> Result<&ProductRow, StoreError> {
        self.set_new_price(id, "")
    }

    /// Open a product's detail row, creating default margin inputs on first use.
    pub fn expand(&mut self, id: &ProductId) -> Result<&MarginInputs, StoreError> {
        let i = self.index_of(id)?;
        let product = &self.rows[i].product;
        let config = &self.config;
        Ok(self
            .margins
            .entry(id.clone())
            .or_insert_with(|| MarginInputs::defaults_for(product, config)))
    }

    /// Margin inputs if the row was expanded.
    pub fn margin_inputs(&self, id: &ProductId) -> Option<&MarginInputs> {
        self.margins.get(id)
    }

    /// Set cost per unit. Invalid text leaves the previous value in place.
    pub fn set_cost(&mut self, id: &ProductId, raw: &str) -> Result<&MarginInputs, StoreError> {
        self.edit_margin(id, raw, "cost", |m, cost| m.cost_per_unit = cost)
    }

    /// Set the advisory target margin (0-100). Out-of-range or invalid text is ignored.
    pub fn set_target_margin(&mut self, id: &ProductId, raw: &str) -> Result<&MarginInputs, StoreError> {
        self.edit_margin(id, raw, "target margin", |m, target| m.target_margin_pct = target)
    }

    fn edit_margin(
        &mut self,
        id: &ProductId,
        raw: &str,
        field: &'static str,
        apply: impl FnOnce(&mut MarginInputs, Decimal),
    ) -> Result<&MarginInputs, StoreError> {
        self.expand(id)?;
        let inputs = self
            .margins
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownProduct(id.clone()))?;
        let candidate = parse_amount(raw)
            .map(|v| {
                let mut next = inputs.clone();
                apply(&mut next, v);
                next
            })
            .filter(|next| validate_margin_inputs(next).is_ok());
        match candidate {
            Some(next) => *inputs = next,
            None => warn!(product = %id, raw, field, "ignoring invalid margin input"),
        }
        Ok(&*inputs)
    }

    /// Margin figures for a row, using its projection when present.
    ///
    /// A row that was never expanded is evaluated with default inputs
    /// without storing them.
    pub fn margin(&self, id: &ProductId) -> Result<MarginResult, StoreError> {
        let row = self.row(id)?;
        let inputs = self
            .margins
            .get(id)
            .cloned()
            .unwrap_or_else(|| MarginInputs::defaults_for(&row.product, &self.config));
        Ok(compute_margin(&row.product, &inputs, row.projection.as_ref()))
    }

    /// Aggregate current and projected totals over every row.
    pub fn portfolio(&self) -> PortfolioTotals {
        let mut current_units: u64 = 0;
        let mut projected_units: u64 = 0;
        let mut current_dollars = Decimal::ZERO;
        let mut projected_dollars = Decimal::ZERO;
        let mut projected_rows = 0;
        for row in &self.rows {
            current_units = current_units.saturating_add(row.product.total_units);
            projected_units = projected_units.saturating_add(row.projected_units());
            current_dollars = current_dollars.saturating_add(row.product.total_dollars);
            projected_dollars = projected_dollars.saturating_add(row.projected_dollars());
            if row.projection.is_some() {
                projected_rows += 1;
            }
        }
        let change_in_dollars = projected_dollars.saturating_sub(current_dollars);
        PortfolioTotals {
            current_units,
            current_dollars,
            projected_units,
            projected_dollars,
            change_in_units: unit_delta(projected_units, current_units),
            change_in_dollars,
            percent_change_dollars: round_half_up(percent_of(change_in_dollars, current_dollars), 2),
            projected_rows,
        }
    }

    /// Return to the seed: clear candidate prices and all margin inputs.
    pub fn reset(&mut self) {
        self.rows = self.seed.iter().cloned().map(ProductRow::fresh).collect();
        self.margins.clear();
        info!(products = self.rows.len(), "simulation store reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use promo_core::seed;

    fn store() -> SimulationStore {
        SimulationStore::from_seed(seed::products(), SimConfig::default()).unwrap()
    }

    fn sku(s: &str) -> ProductId {
        ProductId::from(s)
    }

    #[test]
    fn price_edit_recomputes_only_that_row() {
        let mut s = store();
        let row = s.set_new_price(&sku("SKU-1001"), "10.00").unwrap();
        let proj = row.projection.as_ref().unwrap();
        assert_eq!(proj.new_units, 18_528);
        assert_eq!(proj.percent_change_dollars, Decimal::new(-158, 2));
        assert!(s.rows()[1..].iter().all(|r| r.projection.is_none()));
    }

    #[test]
    fn invalid_price_clears_projection() {
        let mut s = store();
        s.set_new_price(&sku("SKU-1002"), "3.99").unwrap();
        let row = s.set_new_price(&sku("SKU-1002"), "abc").unwrap();
        assert!(row.projection.is_none());
        assert!(row.new_price.is_invalid());
        assert_eq!(row.projected_units(), 42_310);
        let row = s.clear_new_price(&sku("SKU-1002")).unwrap();
        assert_eq!(row.new_price.raw(), "");
    }

    #[test]
    fn unknown_product_is_an_error() {
        let mut s = store();
        assert_eq!(
            s.set_new_price(&sku("nope"), "1").unwrap_err(),
            StoreError::UnknownProduct(sku("nope"))
        );
        assert!(s.margin(&sku("nope")).is_err());
    }

    #[test]
    fn expand_creates_defaults_once() {
        let mut s = store();
        assert!(s.margin_inputs(&sku("SKU-1001")).is_none());
        let m = s.expand(&sku("SKU-1001")).unwrap().clone();
        assert_eq!(m.cost_per_unit, Decimal::new(567, 2));
        assert_eq!(m.target_margin_pct, Decimal::new(35, 0));
        s.set_cost(&sku("SKU-1001"), "5.00").unwrap();
        // re-expanding keeps the edited value
        assert_eq!(
            s.expand(&sku("SKU-1001")).unwrap().cost_per_unit,
            Decimal::new(5, 0)
        );
    }

    #[test]
    fn invalid_margin_edits_are_ignored() {
        let mut s = store();
        s.set_cost(&sku("SKU-1003"), "oops").unwrap();
        s.set_target_margin(&sku("SKU-1003"), "150").unwrap();
        let m = s.margin_inputs(&sku("SKU-1003")).unwrap();
        assert_eq!(m.cost_per_unit, Decimal::new(329, 2));
        assert_eq!(m.target_margin_pct, Decimal::new(35, 0));
        assert_eq!(
            s.set_target_margin(&sku("SKU-1003"), "42%").unwrap().target_margin_pct,
            Decimal::new(42, 0)
        );
    }

    #[test]
    fn margin_edits_feed_target_price() {
        let mut s = store();
        let id = sku("SKU-1001");
        s.set_cost(&id, "$6.00").unwrap();
        s.set_target_margin(&id, "40").unwrap();
        let m = s.margin(&id).unwrap();
        assert_eq!(m.target_price, Some(Decimal::new(10, 0)));
        // 9.45 at $6 cost is a 36.51% margin
        assert_eq!(m.current_margin_pct, Decimal::new(3651, 2));
        assert!(!m.meets_target);
        s.set_new_price(&id, "10.00").unwrap();
        assert!(s.margin(&id).unwrap().meets_target);
    }

    #[test]
    fn margin_follows_projection() {
        let mut s = store();
        let id = sku("SKU-1004");
        let before = s.margin(&id).unwrap();
        assert_eq!(before.current_margin_pct, Decimal::new(4006, 2));
        assert_eq!(before.margin_change_pct, Decimal::ZERO);
        s.set_new_price(&id, "7.99").unwrap();
        let after = s.margin(&id).unwrap();
        assert!(after.projected_margin_pct > after.current_margin_pct);
        assert_eq!(after.current_margin_pct, before.current_margin_pct);
    }

    #[test]
    fn portfolio_sums_projected_and_unprojected_rows() {
        let mut s = store();
        let base = s.portfolio();
        assert_eq!(base.change_in_dollars, Decimal::ZERO);
        assert_eq!(base.projected_rows, 0);
        assert_eq!(base.current_dollars, Decimal::new(834_672, 0));

        s.set_new_price(&sku("SKU-1001"), "10.00").unwrap();
        let t = s.portfolio();
        assert_eq!(t.projected_rows, 1);
        assert_eq!(t.change_in_units, -1_391);
        assert_eq!(t.change_in_dollars, Decimal::new(-2_978, 0));
        assert_eq!(t.projected_dollars, Decimal::new(831_694, 0));
        assert_eq!(t.percent_change_dollars, Decimal::new(-36, 2));
    }

    #[test]
    fn reset_restores_seed() {
        let mut s = store();
        s.set_new_price(&sku("SKU-1001"), "11").unwrap();
        s.expand(&sku("SKU-1001")).unwrap();
        s.reset();
        assert!(s.rows().iter().all(|r| r.projection.is_none()));
        assert!(s.margin_inputs(&sku("SKU-1001")).is_none());
        assert_eq!(s.rows().len(), seed::products().len());
    }

    #[test]
    fn invalid_seed_rejected() {
        let mut products = seed::products();
        products.push(products[0].clone());
        assert!(matches!(
            SimulationStore::from_seed(products, SimConfig::default()),
            Err(StoreError::Invalid(_))
        ));
    }

    #[test]
    fn rows_serialize_for_export() {
        let mut s = store();
        s.set_new_price(&sku("SKU-1005"), "10.99").unwrap();
        let json = serde_json::to_string(&s.rows()[4]).unwrap();
        let back: ProductRow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s.rows()[4]);
    }

    proptest! {
        #[test]
        fn portfolio_change_is_sum_of_row_changes(
            prices in proptest::collection::vec(0i64..2_000, 6),
            edited in proptest::collection::vec(any::<bool>(), 6),
        ) {
            let mut s = store();
            let ids: Vec<ProductId> = s.rows().iter().map(|r| r.product.id.clone()).collect();
            for ((id, cents), on) in ids.iter().zip(&prices).zip(&edited) {
                if *on {
                    s.set_new_price(id, &Decimal::new(*cents, 2).to_string()).unwrap();
                }
            }
            let t = s.portfolio();
            let row_sum: Decimal = s
                .rows()
                .iter()
                .filter_map(|r| r.projection.as_ref().map(|p| p.change_in_dollars))
                .sum();
            prop_assert_eq!(t.change_in_dollars, row_sum);
            prop_assert_eq!(t.projected_rows, edited.iter().filter(|b| **b).count());
        }
    }
}
