//! Comparison session: one finalized selection of columns under a rank mode.

use crate::StoreError;
use promo_core::{validate_columns, AttributeValue, ComparisonColumn};
use promo_rank::{rank_in_place, summarize_set, RankMode, SetSummary};
use std::collections::BTreeSet;
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct ComparisonSession {
    mode: RankMode,
    columns: Vec<ComparisonColumn>,
}

impl ComparisonSession {
    /// Take ownership of a finalized selection and rank it.
    pub fn finalize(columns: Vec<ComparisonColumn>, mode: RankMode) -> Result<Self, StoreError> {
        validate_columns(&columns)?;
        let mut session = Self { mode, columns };
        session.rerank();
        info!(columns = session.columns.len(), "comparison finalized");
        Ok(session)
    }

    fn rerank(&mut self) {
        rank_in_place(&mut self.columns, &self.mode);
    }

    pub fn mode(&self) -> &RankMode {
        &self.mode
    }

    pub fn columns(&self) -> &[ComparisonColumn] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn set_mode(&mut self, mode: RankMode) {
        self.mode = mode;
        self.rerank();
    }

    fn column_mut(&mut self, id: &str) -> Result<&mut ComparisonColumn, StoreError> {
        self.columns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::UnknownColumn(id.to_string()))
    }

    /// Overwrite one attribute and re-rank the whole set.
    pub fn set_attribute(
        &mut self,
        column_id: &str,
        name: &str,
        value: AttributeValue,
    ) -> Result<(), StoreError> {
        self.column_mut(column_id)?
            .attributes
            .insert(name.to_string(), value);
        debug!(column = column_id, attribute = name, "attribute set");
        self.rerank();
        Ok(())
    }

    /// Flip a yes/no attribute (a missing one counts as `false`) and re-rank.
    ///
    /// Returns the new value.
    pub fn toggle_attribute(&mut self, column_id: &str, name: &str) -> Result<bool, StoreError> {
        let col = self.column_mut(column_id)?;
        let next = match col.attributes.get(name) {
            None => true,
            Some(AttributeValue::Flag(b)) => !b,
            Some(_) => {
                return Err(StoreError::NotAFlag {
                    column: column_id.to_string(),
                    attribute: name.to_string(),
                })
            }
        };
        col.attributes
            .insert(name.to_string(), AttributeValue::Flag(next));
        debug!(column = column_id, attribute = name, value = next, "attribute toggled");
        self.rerank();
        Ok(next)
    }

    pub fn best(&self) -> Option<&ComparisonColumn> {
        self.columns.iter().find(|c| c.is_best_performing)
    }

    /// Denominator for footer percentages: the configured count in boolean
    /// mode, otherwise the number of distinct attribute names in the set.
    pub fn attribute_count(&self) -> usize {
        match &self.mode {
            RankMode::Boolean { attribute_count } => *attribute_count,
            RankMode::Metric { .. } => self
                .columns
                .iter()
                .flat_map(|c| c.attributes.keys())
                .collect::<BTreeSet<_>>()
                .len(),
        }
    }

    pub fn summaries(&self) -> SetSummary {
        summarize_set(&self.columns, self.attribute_count())
    }

    /// Discard every column.
    pub fn reset(&mut self) {
        self.columns.clear();
        info!("comparison reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promo_core::seed;
    use rust_decimal::Decimal;

    fn plans() -> ComparisonSession {
        ComparisonSession::finalize(
            seed::plan_columns(),
            RankMode::Boolean {
                attribute_count: seed::PLAN_FEATURES.len(),
            },
        )
        .unwrap()
    }

    #[test]
    fn finalize_ranks_immediately() {
        let s = plans();
        assert_eq!(s.best().map(|c| c.id.as_str()), Some("growth"));
        assert_eq!(s.columns().iter().filter(|c| c.is_best_performing).count(), 1);
    }

    #[test]
    fn toggle_moves_best_and_keeps_single_flag() {
        let mut s = plans();
        // "scale" gains a 13th feature
        assert!(s.toggle_attribute("scale", "uptime_sla").unwrap());
        assert_eq!(s.best().map(|c| c.id.as_str()), Some("scale"));
        assert_eq!(s.columns().iter().filter(|c| c.is_best_performing).count(), 1);
        // and loses it again: tie goes back to the earlier column
        assert!(!s.toggle_attribute("scale", "uptime_sla").unwrap());
        assert_eq!(s.best().map(|c| c.id.as_str()), Some("growth"));
    }

    #[test]
    fn toggle_rejects_numeric_attributes() {
        let mut s = ComparisonSession::finalize(
            seed::event_columns(),
            RankMode::Metric {
                key: "Sales ROI".into(),
            },
        )
        .unwrap();
        assert_eq!(
            s.toggle_attribute("evt-spring-bogo", "Sales ROI"),
            Err(StoreError::NotAFlag {
                column: "evt-spring-bogo".into(),
                attribute: "Sales ROI".into()
            })
        );
        assert_eq!(
            s.toggle_attribute("missing", "x"),
            Err(StoreError::UnknownColumn("missing".into()))
        );
    }

    #[test]
    fn metric_edit_reranks() {
        let mut s = ComparisonSession::finalize(
            seed::event_columns(),
            RankMode::Metric {
                key: "Sales ROI".into(),
            },
        )
        .unwrap();
        assert_eq!(s.best().map(|c| c.id.as_str()), Some("evt-summer-tpr"));
        s.set_attribute(
            "evt-fall-display",
            "Sales ROI",
            AttributeValue::Number(Decimal::new(25, 1)),
        )
        .unwrap();
        assert_eq!(s.best().map(|c| c.id.as_str()), Some("evt-fall-display"));
        assert_eq!(s.attribute_count(), 4);
    }

    #[test]
    fn switching_mode_reranks() {
        let mut s = ComparisonSession::finalize(
            seed::event_columns(),
            RankMode::Metric {
                key: "Sales ROI".into(),
            },
        )
        .unwrap();
        s.set_mode(RankMode::Metric {
            key: "Trade Spend".into(),
        });
        assert_eq!(s.best().map(|c| c.id.as_str()), Some("evt-spring-bogo"));
    }

    #[test]
    fn summaries_and_reset() {
        let mut s = plans();
        let sum = s.summaries();
        assert_eq!(sum.columns[0].1.total_true, 9);
        assert_eq!(sum.columns[0].1.percentage, 60);
        s.reset();
        assert!(s.is_empty());
        assert!(s.best().is_none());
        assert!(s.summaries().best.is_none());
    }

    #[test]
    fn duplicate_columns_rejected() {
        let mut cols = seed::plan_columns();
        cols.push(cols[0].clone());
        assert!(ComparisonSession::finalize(cols, RankMode::Boolean { attribute_count: 15 }).is_err());
    }
}
