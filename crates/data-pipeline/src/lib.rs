#![deny(warnings)]

//! Export of simulation results.
//!
//! Exports read the projection fields already stored on each row; nothing
//! here recomputes a projection, so files always match what was displayed.

use anyhow::{Context, Result};
use promo_econ::rounding::EM_DASH;
use promo_runtime::{PortfolioTotals, ProductRow};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

const HEADER: [&str; 11] = [
    "id",
    "name",
    "current_price",
    "total_units",
    "total_dollars",
    "new_price",
    "new_units",
    "change_in_units",
    "new_dollars",
    "change_in_dollars",
    "percent_change_dollars",
];

fn dash_or<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string())
        .unwrap_or_else(|| EM_DASH.to_string())
}

fn record(row: &ProductRow) -> [String; 11] {
    let p = &row.product;
    let proj = row.projection.as_ref();
    [
        p.id.0.clone(),
        p.name.clone(),
        p.current_price.to_string(),
        p.total_units.to_string(),
        p.total_dollars.to_string(),
        dash_or(proj.map(|x| x.new_price)),
        dash_or(proj.map(|x| x.new_units)),
        dash_or(proj.map(|x| x.change_in_units)),
        dash_or(proj.map(|x| x.new_dollars)),
        dash_or(proj.map(|x| x.change_in_dollars)),
        dash_or(proj.map(|x| x.percent_change_dollars)),
    ]
}

/// Write one CSV record per row to `out`.
pub fn write_projection_csv<W: Write>(out: W, rows: &[ProductRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(HEADER).context("writing CSV header")?;
    for row in rows {
        wtr.write_record(record(row))
            .with_context(|| format!("writing CSV record for {}", row.product.id))?;
    }
    wtr.flush().context("flushing CSV writer")?;
    Ok(())
}

/// Write the projection CSV to `path`.
pub fn export_projection_csv(path: &Path, rows: &[ProductRow]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating CSV file at {}", path.display()))?;
    write_projection_csv(file, rows)?;
    info!(path = %path.display(), rows = rows.len(), "projection CSV exported");
    Ok(())
}

#[derive(Serialize)]
struct Report<'a> {
    rows: &'a [ProductRow],
    totals: &'a PortfolioTotals,
}

/// Rows and portfolio totals as a JSON value (for stdout).
pub fn report_json(rows: &[ProductRow], totals: &PortfolioTotals) -> Result<serde_json::Value> {
    serde_json::to_value(Report { rows, totals }).context("converting report to JSON value")
}

/// Sum of projected revenue across exported rows; equals the portfolio total.
pub fn exported_revenue(rows: &[ProductRow]) -> Decimal {
    rows.iter().map(ProductRow::projected_dollars).sum()
}
