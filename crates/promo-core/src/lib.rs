#![deny(warnings)]

//! Core domain models and invariants for the promotion simulator.
//!
//! This crate defines the serializable types shared by the pricing engine,
//! the comparison utilities and the CLI, plus validation helpers that guard
//! seed data before it is loaded into a store.

pub mod input;
pub mod seed;

pub use input::{parse_amount, PriceInput};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Price elasticity used when a scenario does not override it.
pub const DEFAULT_ELASTICITY: Decimal = Decimal::from_parts(12, 0, 0, true, 1);

/// Unique identifier for a simulated product, e.g. "SKU-1001".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        ProductId(s.to_string())
    }
}

/// A product as supplied by seed data. Never mutated after load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Current unit price (>= 0).
    pub current_price: Decimal,
    /// Units sold over the trailing period.
    pub total_units: u64,
    /// Revenue over the trailing period (>= 0). Nominally price x units.
    pub total_dollars: Decimal,
}

/// Cost assumptions attached to a product's detail row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarginInputs {
    /// Cost per unit (>= 0).
    pub cost_per_unit: Decimal,
    /// Advisory target margin in percent (0-100).
    pub target_margin_pct: Decimal,
}

impl MarginInputs {
    /// Defaults used on first expansion: cost as a fraction of price, rounded to cents.
    pub fn defaults_for(product: &Product, config: &SimConfig) -> Self {
        Self {
            cost_per_unit: (product.current_price * config.default_cost_ratio).round_dp(2),
            target_margin_pct: config.default_target_margin_pct,
        }
    }
}

/// A single attribute value of a comparison column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Yes/no capability or feature.
    Flag(bool),
    /// Numeric metric, e.g. "Sales ROI".
    Number(Decimal),
    /// Free text; may still carry a number such as "$1,200".
    Text(String),
}

impl AttributeValue {
    /// True only for `Flag(true)`.
    pub fn is_true(&self) -> bool {
        matches!(self, AttributeValue::Flag(true))
    }

    /// Numeric reading of the value. Flags and unparsable text yield `None`.
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Text(s) => parse_amount(s),
            AttributeValue::Flag(_) => None,
        }
    }
}

/// An entity under comparison: a plan, event or campaign.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonColumn {
    /// Column identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Attribute name to value.
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Derived by ranking; never set by hand.
    #[serde(default)]
    pub is_best_performing: bool,
}

impl ComparisonColumn {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            attributes: BTreeMap::new(),
            is_best_performing: false,
        }
    }

    /// Builder-style attribute insertion.
    pub fn with(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Number of attributes whose value is `Flag(true)`.
    pub fn true_count(&self) -> usize {
        self.attributes.values().filter(|v| v.is_true()).count()
    }
}

/// Simulation configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Constant price elasticity of demand (< 0).
    pub elasticity: Decimal,
    /// Default cost per unit as a fraction of current price.
    pub default_cost_ratio: Decimal,
    /// Default advisory target margin in percent.
    pub default_target_margin_pct: Decimal,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            elasticity: DEFAULT_ELASTICITY,
            default_cost_ratio: Decimal::new(60, 2),
            default_target_margin_pct: Decimal::new(35, 0),
        }
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Price, cost or revenue must be non-negative.
    #[error("negative monetary value for {0}")]
    NegativeMoney(String),
    /// Names and titles must not be blank.
    #[error("blank name for {0}")]
    BlankName(String),
    /// Identifiers must be unique within a set.
    #[error("duplicate identifier: {0}")]
    DuplicateId(String),
    /// Elasticity must be strictly negative.
    #[error("price elasticity must be < 0")]
    ElasticityNonNegative,
    /// Percentages and ratios must fall in their documented range.
    #[error("{0} is out of range")]
    OutOfRange(&'static str),
}

/// Validate a single product.
pub fn validate_product(p: &Product) -> Result<(), ValidationError> {
    if p.name.trim().is_empty() {
        return Err(ValidationError::BlankName(p.id.0.clone()));
    }
    if p.current_price < Decimal::ZERO || p.total_dollars < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney(p.id.0.clone()));
    }
    Ok(())
}

/// Validate a product seed list, including id uniqueness.
pub fn validate_products(products: &[Product]) -> Result<(), ValidationError> {
    let mut ids: BTreeSet<&ProductId> = BTreeSet::new();
    for p in products {
        validate_product(p)?;
        if !ids.insert(&p.id) {
            return Err(ValidationError::DuplicateId(p.id.0.clone()));
        }
    }
    Ok(())
}

/// Validate margin inputs. Target margin is advisory but still bounded.
pub fn validate_margin_inputs(m: &MarginInputs) -> Result<(), ValidationError> {
    if m.cost_per_unit < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney("cost_per_unit".into()));
    }
    if m.target_margin_pct < Decimal::ZERO || m.target_margin_pct > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange("target_margin_pct"));
    }
    Ok(())
}

/// Validate a set of comparison columns.
pub fn validate_columns(columns: &[ComparisonColumn]) -> Result<(), ValidationError> {
    let mut ids: BTreeSet<&str> = BTreeSet::new();
    for c in columns {
        if c.title.trim().is_empty() {
            return Err(ValidationError::BlankName(c.id.clone()));
        }
        if !ids.insert(c.id.as_str()) {
            return Err(ValidationError::DuplicateId(c.id.clone()));
        }
    }
    Ok(())
}

/// Validate simulation configuration.
pub fn validate_config(cfg: &SimConfig) -> Result<(), ValidationError> {
    if cfg.elasticity >= Decimal::ZERO {
        return Err(ValidationError::ElasticityNonNegative);
    }
    if cfg.default_cost_ratio < Decimal::ZERO {
        return Err(ValidationError::OutOfRange("default_cost_ratio"));
    }
    if cfg.default_target_margin_pct < Decimal::ZERO
        || cfg.default_target_margin_pct > Decimal::ONE_HUNDRED
    {
        return Err(ValidationError::OutOfRange("default_target_margin_pct"));
    }
    Ok(())
}
