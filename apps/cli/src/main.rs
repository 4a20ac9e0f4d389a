#![deny(warnings)]

//! Headless CLI: load a scenario, apply price edits and print projections,
//! margins, portfolio totals and comparison rankings.

mod scenario;

use anyhow::{bail, Context, Result};
use promo_core::ProductId;
use promo_econ::rounding::{format_count, format_currency, format_pct, format_units, or_dash};
use promo_rank::RankMode;
use promo_runtime::{ComparisonSession, SimulationStore};
use scenario::Scenario;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, PartialEq)]
struct Args {
    scenario: Option<PathBuf>,
    prices: Vec<(String, String)>,
    export: Option<PathBuf>,
    events: Option<PathBuf>,
    metric: Option<String>,
    json: bool,
    version: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut out = Args::default();
    let mut it = args.into_iter().peekable();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--scenario" => out.scenario = it.next().map(PathBuf::from),
            "--price" => {
                let Some(kv) = it.next() else {
                    bail!("--price expects <id>=<value>");
                };
                let Some((id, value)) = kv.split_once('=') else {
                    bail!("--price expects <id>=<value>, got {kv}");
                };
                out.prices.push((id.to_string(), value.to_string()));
            }
            "--export" => out.export = it.next().map(PathBuf::from),
            "--events" => {
                // the path is optional; without one the default library is used
                let path = it.next_if(|next| !next.starts_with("--"));
                out.events = Some(
                    path.map(PathBuf::from)
                        .unwrap_or_else(|| PathBuf::from(persistence::default_library_path())),
                );
            }
            "--metric" => out.metric = it.next(),
            "--json" => out.json = true,
            "--version" => out.version = true,
            _ => {}
        }
    }
    Ok(out)
}

fn apply_margin_edits(store: &mut SimulationStore, scenario: &Scenario) -> Result<()> {
    for (id, edit) in &scenario.margins {
        let id = ProductId(id.clone());
        let ctx = || format!("applying margin inputs for {id}");
        store.expand(&id).with_context(ctx)?;
        if let Some(cost) = &edit.cost {
            store.set_cost(&id, cost).with_context(ctx)?;
        }
        if let Some(target) = &edit.target_margin {
            store.set_target_margin(&id, target).with_context(ctx)?;
        }
    }
    Ok(())
}

fn print_rows(store: &SimulationStore) -> Result<()> {
    println!(
        "{:<10} {:<24} {:>9} {:>9} {:>10} {:>12} {:>9} {:>9} {:>9} {:>9}",
        "id", "name", "price", "new", "units", "revenue", "rev chg", "margin", "target", "on target"
    );
    for row in store.rows() {
        let p = &row.product;
        let proj = row.projection.as_ref();
        let margin = store.margin(&p.id)?;
        println!(
            "{:<10} {:<24} {:>9} {:>9} {:>10} {:>12} {:>9} {:>9} {:>9} {:>9}",
            p.id,
            p.name,
            format_currency(p.current_price),
            or_dash(proj.map(|x| x.new_price), format_currency),
            format_units(row.projected_units()),
            format_currency(row.projected_dollars()),
            or_dash(proj.map(|x| x.percent_change_dollars), format_pct),
            format_pct(margin.projected_margin_pct),
            or_dash(margin.target_price, format_currency),
            if margin.meets_target { "yes" } else { "no" },
        );
    }
    let t = store.portfolio();
    println!(
        "Portfolio | units: {} -> {} ({}) | revenue: {} -> {} ({}, {}) | projected rows: {}",
        format_units(t.current_units),
        format_units(t.projected_units),
        format_count(t.change_in_units),
        format_currency(t.current_dollars),
        format_currency(t.projected_dollars),
        format_currency(t.change_in_dollars),
        format_pct(t.percent_change_dollars),
        t.projected_rows
    );
    Ok(())
}

fn print_session(name: &str, session: &ComparisonSession) {
    let summary = session.summaries();
    println!("Comparison: {name}");
    for (col, (_, s)) in session.columns().iter().zip(&summary.columns) {
        let marker = if col.is_best_performing { "*" } else { " " };
        let score = promo_rank::score_column(col, session.mode());
        println!(
            " {marker} {:<24} score {:>8} | {} of {} yes ({}%)",
            col.title,
            score,
            s.total_true,
            session.attribute_count(),
            s.percentage
        );
    }
    match session.best() {
        Some(best) => println!("   best: {}", best.title),
        None => println!("   best: {}", promo_econ::rounding::EM_DASH),
    }
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.version {
        println!(
            "promo-sim {} ({} {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }
    info!(scenario = ?args.scenario, edits = args.prices.len(), "starting CLI");

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::builtin(),
    };

    let mut store = SimulationStore::from_seed(scenario.products.clone(), scenario.config.clone())?;
    let edits = scenario
        .price_edits
        .iter()
        .map(|(id, v)| (id.clone(), v.clone()))
        .chain(args.prices.iter().cloned());
    for (id, raw) in edits {
        store
            .set_new_price(&ProductId(id.clone()), &raw)
            .with_context(|| format!("applying price edit for {id}"))?;
    }
    apply_margin_edits(&mut store, &scenario)?;

    if args.json {
        let report = data_pipeline::report_json(store.rows(), &store.portfolio())?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_rows(&store)?;
        for cmp in &scenario.comparisons {
            let session = ComparisonSession::finalize(cmp.columns.clone(), cmp.mode.clone())?;
            print_session(&cmp.name, &session);
        }
    }

    if let Some(path) = &args.events {
        let library = persistence::EventLibrary::open(path)?;
        let ids: Vec<&str> = library.list().iter().map(|e| e.id.as_str()).collect();
        let key = args.metric.clone().unwrap_or_else(|| "Sales ROI".to_string());
        let session =
            ComparisonSession::finalize(library.columns_for(&ids), RankMode::Metric { key })?;
        print_session("Saved events", &session);
    }

    if let Some(path) = &args.export {
        data_pipeline::export_projection_csv(path, store.rows())?;
        println!(
            "Exported {} rows ({} projected revenue) to {}",
            store.rows().len(),
            format_currency(data_pipeline::exported_revenue(store.rows())),
            path.display()
        );
    }

    Ok(())
}
