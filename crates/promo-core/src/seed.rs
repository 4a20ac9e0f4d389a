//! Built-in seed data used when no scenario file is supplied.
//!
//! Seeds are returned by value; callers load them into a store and never
//! mutate the originals.

use crate::{AttributeValue, ComparisonColumn, Product, ProductId};
use rust_decimal::Decimal;

/// Attribute names shared by the plan comparison seed.
pub const PLAN_FEATURES: [&str; 15] = [
    "api_access",
    "audit_log",
    "bulk_import",
    "custom_roles",
    "data_export",
    "dedicated_support",
    "event_library",
    "margin_simulator",
    "multi_retailer",
    "price_simulator",
    "scenario_sharing",
    "sso",
    "tpo_comparison",
    "uptime_sla",
    "user_management",
];

fn product(id: &str, name: &str, price_cents: i64, units: u64, dollars: i64) -> Product {
    Product {
        id: ProductId(id.to_string()),
        name: name.to_string(),
        current_price: Decimal::new(price_cents, 2),
        total_units: units,
        total_dollars: Decimal::new(dollars, 0),
    }
}

/// Trailing 52-week product list for the pricing simulator.
pub fn products() -> Vec<Product> {
    vec![
        product("SKU-1001", "Sparkling Water 12pk", 945, 19_919, 188_258),
        product("SKU-1002", "Kettle Chips 8oz", 429, 42_310, 181_510),
        product("SKU-1003", "Granola Bar 6ct", 549, 27_804, 152_644),
        product("SKU-1004", "Cold Brew 32oz", 699, 11_582, 80_958),
        product("SKU-1005", "Trail Mix 16oz", 1_199, 8_207, 98_402),
        product("SKU-1006", "Greek Yogurt 4pk", 379, 35_066, 132_900),
    ]
}

fn plan(id: &str, title: &str, enabled: usize) -> ComparisonColumn {
    PLAN_FEATURES
        .iter()
        .enumerate()
        .fold(ComparisonColumn::new(id, title), |col, (i, name)| {
            col.with(*name, AttributeValue::Flag(i < enabled))
        })
}

/// Three subscription plans compared feature by feature.
pub fn plan_columns() -> Vec<ComparisonColumn> {
    vec![
        plan("starter", "Starter", 9),
        plan("growth", "Growth", 12),
        plan("scale", "Scale", 12),
    ]
}

fn event(
    id: &str,
    title: &str,
    retailer: &str,
    roi: Decimal,
    lift: &str,
    spend: Decimal,
) -> ComparisonColumn {
    ComparisonColumn::new(id, title)
        .with("Retailer", AttributeValue::Text(retailer.to_string()))
        .with("Sales ROI", AttributeValue::Number(roi))
        .with("Volume Lift", AttributeValue::Text(lift.to_string()))
        .with("Trade Spend", AttributeValue::Number(spend))
}

/// Trade promotion events compared on quantitative metrics.
pub fn event_columns() -> Vec<ComparisonColumn> {
    vec![
        event(
            "evt-spring-bogo",
            "Spring BOGO",
            "FreshMart",
            Decimal::new(142, 2),
            "18.4%",
            Decimal::new(42_000, 0),
        ),
        event(
            "evt-summer-tpr",
            "Summer TPR 20%",
            "ValueGrocer",
            Decimal::new(187, 2),
            "24.1%",
            Decimal::new(35_500, 0),
        ),
        event(
            "evt-fall-display",
            "Fall Endcap Display",
            "FreshMart",
            Decimal::new(113, 2),
            "9.7%",
            Decimal::new(27_250, 0),
        ),
    ]
}
