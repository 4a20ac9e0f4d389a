#![deny(warnings)]

//! Best-performer ranking and footer summaries for comparison sets.
//!
//! Ranking is always a full re-derivation: every column's flag is cleared
//! and at most one is set again, so a set can never carry two best columns.

use promo_core::ComparisonColumn;
use promo_econ::rounding::{percent_of, round_half_up};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How columns are scored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RankMode {
    /// Share of `true` attributes out of `attribute_count`, as a whole percent.
    Boolean { attribute_count: usize },
    /// Raw numeric value of one designated attribute, e.g. "Sales ROI".
    Metric { key: String },
}

/// Score of one column under `mode`.
///
/// Missing or non-numeric metric values score 0; the column is not modified.
pub fn score_column(column: &ComparisonColumn, mode: &RankMode) -> Decimal {
    match mode {
        RankMode::Boolean { attribute_count } => {
            let trues = column.true_count().min(*attribute_count);
            round_half_up(
                percent_of(Decimal::from(trues), Decimal::from(*attribute_count)),
                0,
            )
        }
        RankMode::Metric { key } => column
            .attributes
            .get(key)
            .and_then(|v| v.as_number())
            .unwrap_or(Decimal::ZERO),
    }
}

/// Index of the best column: left-to-right scan, replaced only on a strictly
/// greater score, so the first of equal scores wins.
pub fn best_index(columns: &[ComparisonColumn], mode: &RankMode) -> Option<usize> {
    let mut best: Option<(usize, Decimal)> = None;
    for (i, col) in columns.iter().enumerate() {
        let s = score_column(col, mode);
        match best {
            Some((_, top)) if s <= top => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

/// Re-derive `is_best_performing` for every column in place.
pub fn rank_in_place(columns: &mut [ComparisonColumn], mode: &RankMode) -> Option<usize> {
    let best = best_index(columns, mode);
    for (i, col) in columns.iter_mut().enumerate() {
        col.is_best_performing = Some(i) == best;
    }
    debug!(columns = columns.len(), ?best, "ranked comparison set");
    best
}

/// Rank `columns`, returning them annotated with `is_best_performing`.
pub fn rank_columns(mut columns: Vec<ComparisonColumn>, mode: &RankMode) -> Vec<ComparisonColumn> {
    rank_in_place(&mut columns, mode);
    columns
}

/// Footer counts for one column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_true: usize,
    /// Whole percent in [0, 100].
    pub percentage: u8,
}

/// Count `true` attributes of `column` against `total_attributes`.
///
/// The count is capped at `total_attributes`; a zero total gives 0%.
pub fn summarize(column: &ComparisonColumn, total_attributes: usize) -> Summary {
    let total_true = column.true_count().min(total_attributes);
    let pct = if total_attributes == 0 {
        0
    } else {
        // (2t + n) / 2n is round-half-up of t/n*100 in integers
        ((200 * total_true + total_attributes) / (2 * total_attributes)).min(100) as u8
    };
    Summary {
        total_true,
        percentage: pct,
    }
}

/// Summaries for a whole set plus the best column's own summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSummary {
    pub columns: Vec<(String, Summary)>,
    pub best: Option<(String, Summary)>,
}

/// Summarize every column; `best` follows the columns' current flags.
pub fn summarize_set(columns: &[ComparisonColumn], total_attributes: usize) -> SetSummary {
    let columns_out: Vec<(String, Summary)> = columns
        .iter()
        .map(|c| (c.id.clone(), summarize(c, total_attributes)))
        .collect();
    let best = columns
        .iter()
        .find(|c| c.is_best_performing)
        .map(|c| (c.id.clone(), summarize(c, total_attributes)));
    SetSummary {
        columns: columns_out,
        best,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use promo_core::{seed, AttributeValue};

    fn flags(id: &str, trues: usize, total: usize) -> ComparisonColumn {
        (0..total).fold(ComparisonColumn::new(id, id.to_uppercase()), |c, i| {
            c.with(format!("f{i:02}"), AttributeValue::Flag(i < trues))
        })
    }

    fn best_ids(cols: &[ComparisonColumn]) -> Vec<&str> {
        cols.iter()
            .filter(|c| c.is_best_performing)
            .map(|c| c.id.as_str())
            .collect()
    }

    #[test]
    fn first_of_equal_top_scores_wins() {
        let cols = vec![flags("a", 9, 15), flags("b", 12, 15), flags("c", 12, 15)];
        let ranked = rank_columns(cols, &RankMode::Boolean { attribute_count: 15 });
        assert_eq!(best_ids(&ranked), vec!["b"]);
        assert_eq!(
            score_column(&ranked[0], &RankMode::Boolean { attribute_count: 15 }),
            Decimal::new(60, 0)
        );
    }

    #[test]
    fn seed_plans_rank_growth_first() {
        let ranked = rank_columns(
            seed::plan_columns(),
            &RankMode::Boolean {
                attribute_count: seed::PLAN_FEATURES.len(),
            },
        );
        assert_eq!(best_ids(&ranked), vec!["growth"]);
    }

    #[test]
    fn stale_flags_are_cleared() {
        let mut cols = vec![flags("a", 3, 5), flags("b", 1, 5)];
        cols[1].is_best_performing = true;
        let ranked = rank_columns(cols, &RankMode::Boolean { attribute_count: 5 });
        assert_eq!(best_ids(&ranked), vec!["a"]);
    }

    #[test]
    fn metric_mode_uses_designated_key() {
        let ranked = rank_columns(
            seed::event_columns(),
            &RankMode::Metric {
                key: "Sales ROI".into(),
            },
        );
        assert_eq!(best_ids(&ranked), vec!["evt-summer-tpr"]);

        let by_lift = rank_columns(
            seed::event_columns(),
            &RankMode::Metric {
                key: "Volume Lift".into(),
            },
        );
        assert_eq!(best_ids(&by_lift), vec!["evt-summer-tpr"]);
    }

    #[test]
    fn metric_mode_treats_missing_and_text_as_zero() {
        let cols = vec![
            ComparisonColumn::new("a", "A").with("ROI", AttributeValue::Text("n/a".into())),
            ComparisonColumn::new("b", "B"),
            ComparisonColumn::new("c", "C").with("ROI", AttributeValue::Number(Decimal::new(-1, 0))),
        ];
        let ranked = rank_columns(cols.clone(), &RankMode::Metric { key: "ROI".into() });
        assert_eq!(best_ids(&ranked), vec!["a"]);
        // stored values untouched
        assert_eq!(ranked[0].attributes, cols[0].attributes);
        assert!(ranked[1].attributes.is_empty());
    }

    #[test]
    fn empty_set_has_no_best() {
        assert!(rank_columns(vec![], &RankMode::Boolean { attribute_count: 3 }).is_empty());
        assert_eq!(best_index(&[], &RankMode::Metric { key: "x".into() }), None);
    }

    #[test]
    fn summary_of_nine_out_of_fifteen() {
        let s = summarize(&flags("a", 9, 15), 15);
        assert_eq!(
            s,
            Summary {
                total_true: 9,
                percentage: 60
            }
        );
        assert_eq!(summarize(&flags("a", 1, 3), 3).percentage, 33);
        assert_eq!(summarize(&flags("a", 2, 3), 3).percentage, 67);
        assert_eq!(summarize(&flags("a", 1, 8), 8).percentage, 13);
        assert_eq!(summarize(&flags("a", 4, 4), 0).percentage, 0);
    }

    #[test]
    fn set_summary_reports_best() {
        let ranked = rank_columns(
            seed::plan_columns(),
            &RankMode::Boolean { attribute_count: 15 },
        );
        let s = summarize_set(&ranked, 15);
        assert_eq!(s.columns.len(), 3);
        assert_eq!(
            s.best,
            Some((
                "growth".to_string(),
                Summary {
                    total_true: 12,
                    percentage: 80
                }
            ))
        );
    }

    proptest! {
        #[test]
        fn ranking_is_deterministic_with_single_best(
            counts in proptest::collection::vec(0usize..=10, 1..8),
            toggle in 0usize..8,
        ) {
            let mode = RankMode::Boolean { attribute_count: 10 };
            let cols: Vec<_> = counts.iter().enumerate().map(|(i, n)| flags(&format!("c{i}"), *n, 10)).collect();
            let a = rank_columns(cols.clone(), &mode);
            let b = rank_columns(cols, &mode);
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a.iter().filter(|c| c.is_best_performing).count(), 1);

            let mut toggled = a;
            let idx = toggle % toggled.len();
            let flipped = !toggled[idx].attributes["f09"].is_true();
            toggled[idx].attributes.insert("f09".into(), AttributeValue::Flag(flipped));
            let again = rank_columns(toggled, &mode);
            prop_assert_eq!(again.iter().filter(|c| c.is_best_performing).count(), 1);
        }

        #[test]
        fn tie_goes_to_first(n in 0usize..=10, before in 0usize..5) {
            let mode = RankMode::Boolean { attribute_count: 10 };
            let mut cols: Vec<_> = (0..before).map(|i| flags(&format!("low{i}"), 0, 10)).collect();
            cols.push(flags("first", n, 10));
            cols.push(flags("second", n, 10));
            let ranked = rank_columns(cols, &mode);
            let best = best_ids(&ranked);
            if n == 0 && before > 0 {
                prop_assert_eq!(best, vec!["low0"]);
            } else {
                prop_assert_eq!(best, vec!["first"]);
            }
        }

        #[test]
        fn summary_bounds(trues in 0usize..40, total in 0usize..40) {
            let s = summarize(&flags("x", trues, trues.max(total)), total);
            prop_assert!(s.total_true <= total);
            prop_assert!(s.percentage <= 100);
        }
    }
}
