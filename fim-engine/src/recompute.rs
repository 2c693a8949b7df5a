//! Full recomputation over the record store for one parameter set.

use crate::aggregator::{AggregateStats, Aggregator};
use crate::evaluator::{evaluate, EvaluatedRecord, RiskBand};
use crate::filter::CompiledFilter;
use fim_model::{
    BuildingRecord, FilterCriteria, GeometryError, Location, MitigationLevel, RecordStore,
    Scenario, ScenarioParameters,
};
use serde::Serialize;
use std::time::Instant;

/// An included record with its derived values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluatedEntry<'a> {
    pub record: &'a BuildingRecord,
    pub evaluated: EvaluatedRecord,
}

/// Result of one recomputation. Built from scratch; never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recomputation<'a> {
    pub params: ScenarioParameters,
    pub criteria: FilterCriteria,
    /// Included records in store order
    pub records: Vec<EvaluatedEntry<'a>>,
    pub stats: AggregateStats,
    /// Set when the polygon was rejected and every record excluded
    pub geometry_error: Option<GeometryError>,
}

impl<'a> Recomputation<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Filter, evaluate and aggregate the store in one pass.
pub fn recompute<'a>(
    store: &'a RecordStore,
    params: ScenarioParameters,
    criteria: &FilterCriteria,
) -> Recomputation<'a> {
    let started = Instant::now();
    let filter = CompiledFilter::new(criteria);

    let mut aggregator = Aggregator::new();
    let mut records = Vec::new();
    for record in store {
        if !filter.includes(record) {
            continue;
        }
        let evaluated = evaluate(record, params);
        aggregator.push(record, &evaluated);
        records.push(EvaluatedEntry { record, evaluated });
    }

    let stats = aggregator.finish();
    log::debug!(
        "[FIM] recompute: {} {} of {} records included, total damage {:.0}, took {:?}",
        params.scenario,
        records.len(),
        store.len(),
        stats.total_damage,
        started.elapsed()
    );

    Recomputation {
        params,
        criteria: criteria.clone(),
        records,
        stats,
        geometry_error: filter.geometry_error().cloned(),
    }
}

/// Records per rayon task.
#[cfg(feature = "parallel")]
pub const SHARD_SIZE: usize = 4096;

/// Sharded variant of [`recompute`]. Shards are merged in store order, so the
/// record list and type ordering match the sequential pass.
#[cfg(feature = "parallel")]
pub fn recompute_parallel<'a>(
    store: &'a RecordStore,
    params: ScenarioParameters,
    criteria: &FilterCriteria,
) -> Recomputation<'a> {
    use rayon::prelude::*;

    let started = Instant::now();
    let filter = CompiledFilter::new(criteria);

    let shards: Vec<(Vec<EvaluatedEntry<'a>>, Aggregator)> = store
        .records()
        .par_chunks(SHARD_SIZE)
        .map(|chunk| {
            let mut aggregator = Aggregator::new();
            let mut records = Vec::new();
            for record in chunk.iter().filter(|r| filter.includes(r)) {
                let evaluated = evaluate(record, params);
                aggregator.push(record, &evaluated);
                records.push(EvaluatedEntry { record, evaluated });
            }
            (records, aggregator)
        })
        .collect();

    let mut aggregator = Aggregator::new();
    let mut records = Vec::new();
    for (shard_records, shard) in shards {
        records.extend(shard_records);
        aggregator.merge(shard);
    }

    let stats = aggregator.finish();
    log::debug!(
        "[FIM] recompute: parallel {} {} of {} records included, took {:?}",
        params.scenario,
        records.len(),
        store.len(),
        started.elapsed()
    );

    Recomputation {
        params,
        criteria: criteria.clone(),
        records,
        stats,
        geometry_error: filter.geometry_error().cloned(),
    }
}

/// A building drawn on the flood map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapFeature<'a> {
    pub id: &'a str,
    pub location: Location,
    pub mitigated_depth_code: u8,
    pub damage_value: f64,
    pub risk_band: RiskBand,
}

/// Included buildings inside the flood extent. Buildings mitigated to zero
/// remain, drawn as `Safe`.
pub fn map_layer<'r, 'a>(result: &'r Recomputation<'a>) -> impl Iterator<Item = MapFeature<'a>> + 'r {
    result
        .records
        .iter()
        .filter(|entry| entry.evaluated.in_flood_extent())
        .map(|entry| MapFeature {
            id: entry.record.id.as_str(),
            location: entry.record.location,
            mitigated_depth_code: entry.evaluated.mitigated_depth_code,
            damage_value: entry.evaluated.damage_value,
            risk_band: entry.evaluated.risk_band(),
        })
}

/// Headline figures for one scenario over the whole store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub scenario: Scenario,
    pub scenario_name: String,
    pub total_damage: f64,
    /// Buildings with damage above zero
    pub affected_buildings: u64,
}

/// Unfiltered, unmitigated totals for each scenario.
pub fn scenario_summary(store: &RecordStore) -> Vec<ScenarioSummary> {
    Scenario::ALL
        .iter()
        .map(|&scenario| {
            let params = ScenarioParameters::new(scenario, MitigationLevel::NONE);
            let result = recompute(store, params, &FilterCriteria::everything());
            let affected_buildings = result
                .records
                .iter()
                .filter(|entry| entry.evaluated.damage_value > 0.0)
                .count() as u64;
            ScenarioSummary {
                scenario,
                scenario_name: scenario.return_period_name(),
                total_damage: result.stats.total_damage,
                affected_buildings,
            }
        })
        .collect()
}
