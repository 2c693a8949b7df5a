//! Text and JSON reports for recompute and summary commands.

use crate::params::ParamArgs;
use fim_engine::{scenario_summary, AggregateStats, Recomputation};
use fim_model::{GeometryError, ScenarioParameters};
use fim_utils::money::{format_count, format_millions};
use log::info;
use serde::Serialize;
use std::fmt::Write;

/// Statistics of one recomputation without the per-record list.
#[derive(Debug, Serialize)]
pub struct RecomputeReport<'a> {
    pub params: ScenarioParameters,
    pub included_records: usize,
    pub store_records: usize,
    pub stats: &'a AggregateStats,
    pub geometry_error: Option<&'a GeometryError>,
}

impl<'a> RecomputeReport<'a> {
    pub fn new(result: &'a Recomputation<'_>, store_records: usize) -> RecomputeReport<'a> {
        RecomputeReport {
            params: result.params,
            included_records: result.len(),
            store_records,
            stats: &result.stats,
            geometry_error: result.geometry_error.as_ref(),
        }
    }
}

pub fn run_recompute(dataset: &str, args: &ParamArgs, json: bool) -> anyhow::Result<()> {
    let store = crate::load_store(dataset)?;
    let params = args.resolve()?;
    let result = recompute(&store, &params);
    let report = RecomputeReport::new(&result, store.len());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&report));
    }
    Ok(())
}

#[cfg(feature = "parallel")]
pub(crate) fn recompute<'a>(
    store: &'a fim_model::RecordStore,
    params: &fim_model::RecomputeParams,
) -> Recomputation<'a> {
    fim_engine::recompute_parallel(store, params.scenario, &params.criteria)
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn recompute<'a>(
    store: &'a fim_model::RecordStore,
    params: &fim_model::RecomputeParams,
) -> Recomputation<'a> {
    fim_engine::recompute(store, params.scenario, &params.criteria)
}

/// Dashboard-style text rendering of a report.
pub fn render_text(report: &RecomputeReport<'_>) -> String {
    let stats = report.stats;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Scenario {} ({}), mitigation level {}",
        report.params.scenario.label(),
        report.params.scenario.return_period_name(),
        report.params.mitigation.get()
    );
    let _ = writeln!(
        out,
        "Buildings included: {} of {}",
        format_count(report.included_records as u64),
        format_count(report.store_records as u64)
    );
    if let Some(e) = report.geometry_error {
        let _ = writeln!(out, "Polygon rejected: {}", e);
    }
    let _ = writeln!(out, "Total damage:        {}", format_millions(stats.total_damage));
    let _ = writeln!(out, "Saved by mitigation: {}", format_millions(stats.savings));
    let _ = writeln!(
        out,
        "At risk: {} buildings, {} homes",
        format_count(stats.at_risk_building_count),
        format_count(stats.at_risk_residential_units)
    );
    let _ = writeln!(
        out,
        "Commercial at risk: {} buildings, {} units",
        format_count(stats.commercial_at_risk_count),
        format_count(stats.commercial_units_at_risk)
    );
    let _ = writeln!(out, "Damage by deprivation quintile:");
    for (i, damage) in stats.per_quintile_damage.iter().enumerate() {
        let _ = writeln!(out, "  Q{}  {}", i + 1, format_millions(*damage));
    }
    if stats.unclassified_damage > 0.0 {
        let _ = writeln!(out, "  --  {} unclassified", format_millions(stats.unclassified_damage));
    }
    let _ = writeln!(out, "Building types by homes:");
    for group in &stats.top_type_breakdown {
        let _ = writeln!(
            out,
            "  {:<32} {:>8} {}",
            group.label,
            format_count(group.unit_sum),
            format_millions(group.damage_sum)
        );
    }
    out
}

pub fn run_summary(dataset: &str, output: Option<&str>) -> anyhow::Result<()> {
    let store = crate::load_store(dataset)?;
    let summary = scenario_summary(&store);
    for s in &summary {
        info!(
            "[FIM] summary: {} {} affected, {}",
            s.scenario_name,
            s.affected_buildings,
            format_millions(s.total_damage)
        );
    }

    let json = serde_json::to_string_pretty(&summary)?;
    match output {
        Some(path) => {
            std::fs::write(path, &json)?;
            info!("Summary written to {}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}
