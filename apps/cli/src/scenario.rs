//! YAML scenario files: seed data, configuration and scripted price edits.

use anyhow::{Context, Result};
use promo_core::{seed, ComparisonColumn, Product, SimConfig};
use promo_rank::RankMode;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// One comparison screen in a scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct ComparisonSpec {
    pub name: String,
    pub mode: RankMode,
    pub columns: Vec<ComparisonColumn>,
}

/// Raw cost and target-margin text for one product's detail row.
#[derive(Debug, Clone, Deserialize)]
pub struct MarginEdit {
    #[serde(default)]
    pub cost: Option<String>,
    #[serde(default)]
    pub target_margin: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: SimConfig,
    pub products: Vec<Product>,
    #[serde(default)]
    pub comparisons: Vec<ComparisonSpec>,
    /// Product id to raw new-price text.
    #[serde(default)]
    pub price_edits: BTreeMap<String, String>,
    /// Product id to margin inputs, applied after the price edits.
    #[serde(default)]
    pub margins: BTreeMap<String, MarginEdit>,
}

impl Scenario {
    /// Built-in seed data with the default configuration.
    pub fn builtin() -> Self {
        Self {
            config: SimConfig::default(),
            products: seed::products(),
            comparisons: vec![
                ComparisonSpec {
                    name: "Plans".into(),
                    mode: RankMode::Boolean {
                        attribute_count: seed::PLAN_FEATURES.len(),
                    },
                    columns: seed::plan_columns(),
                },
                ComparisonSpec {
                    name: "TPO events".into(),
                    mode: RankMode::Metric {
                        key: "Sales ROI".into(),
                    },
                    columns: seed::event_columns(),
                },
            ],
            price_edits: BTreeMap::new(),
            margins: BTreeMap::new(),
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing scenario YAML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_yaml(&text)
    }
}
