//! Single-pass reduction of filtered, evaluated records into dashboard statistics.

use crate::evaluator::EvaluatedRecord;
use fim_model::BuildingRecord;
use fim_utils::money;
use serde::Serialize;
use std::collections::HashMap;

/// Number of type groups reported by name before the remainder is merged.
pub const TOP_TYPE_GROUPS: usize = 5;

/// Label of the synthetic group holding every type outside the top five.
pub const REMAINDER_LABEL: &str = "Other";

/// Units and damage of the at-risk buildings sharing one type label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeGroup {
    pub label: String,
    pub unit_sum: u64,
    pub damage_sum: f64,
    /// True for the merged group; a dataset may also carry a genuine "Other" label.
    pub is_remainder: bool,
}

/// One bar of a chart, value in millions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDatum {
    pub name: String,
    pub value: f64,
}

/// Statistics for one recomputation. Never patched; rebuilt on every change.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AggregateStats {
    pub total_damage: f64,
    pub original_total_damage: f64,
    pub savings: f64,
    pub at_risk_building_count: u64,
    pub at_risk_residential_units: u64,
    pub commercial_at_risk_count: u64,
    pub commercial_units_at_risk: u64,
    /// Damage for quintiles 1..=5 at indices 0..=4
    pub per_quintile_damage: [f64; 5],
    /// Damage of records without a quintile; part of the total only
    pub unclassified_damage: f64,
    /// At-risk buildings only, ranked by residential units
    pub top_type_breakdown: Vec<TypeGroup>,
    /// Number of records folded in
    pub record_count: u64,
}

impl AggregateStats {
    /// Damage for a quintile rank 1..=5; `None` otherwise.
    pub fn quintile_damage(&self, rank: u8) -> Option<f64> {
        match rank {
            1..=5 => Some(self.per_quintile_damage[usize::from(rank) - 1]),
            _ => None,
        }
    }

    /// `Damage` and `Saved` bars in millions.
    pub fn financial_impact(&self) -> [ChartDatum; 2] {
        [
            ChartDatum {
                name: "Damage".to_string(),
                value: money::to_millions(self.total_damage),
            },
            ChartDatum {
                name: "Saved".to_string(),
                value: money::to_millions(self.savings),
            },
        ]
    }

    /// Q1..Q5 damage in millions.
    pub fn quintile_chart(&self) -> Vec<ChartDatum> {
        self.per_quintile_damage
            .iter()
            .enumerate()
            .map(|(i, damage)| ChartDatum {
                name: format!("Q{}", i + 1),
                value: money::to_millions(*damage),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
struct TypeAccumulator {
    unit_sum: u64,
    damage_sum: f64,
}

/// Streaming accumulator. Holds running totals and one entry per distinct type label.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    // index 0 holds unclassified records, 1..=5 the quintiles
    damage: [f64; 6],
    original_damage: [f64; 6],
    at_risk_building_count: u64,
    at_risk_residential_units: u64,
    commercial_at_risk_count: u64,
    commercial_units_at_risk: u64,
    record_count: u64,
    type_index: HashMap<String, usize>,
    types: Vec<(String, TypeAccumulator)>,
}

impl Aggregator {
    pub fn new() -> Aggregator {
        Aggregator::default()
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Fold one included record.
    pub fn push(&mut self, record: &BuildingRecord, evaluated: &EvaluatedRecord) {
        self.record_count += 1;

        let bucket = usize::from(record.quintile.get());
        self.damage[bucket] += evaluated.damage_value;
        self.original_damage[bucket] += evaluated.original_damage_value;

        if !evaluated.in_flood_extent() {
            return;
        }
        self.at_risk_building_count += 1;
        self.at_risk_residential_units += u64::from(record.residential_units);
        if record.use_class.has_commercial_use() {
            self.commercial_at_risk_count += 1;
            self.commercial_units_at_risk += u64::from(record.commercial_units);
        }

        let slot = match self.type_index.get(record.type_label.as_str()) {
            Some(&slot) => slot,
            None => {
                self.type_index
                    .insert(record.type_label.clone(), self.types.len());
                self.types
                    .push((record.type_label.clone(), TypeAccumulator::default()));
                self.types.len() - 1
            }
        };
        let group = &mut self.types[slot].1;
        group.unit_sum += u64::from(record.residential_units);
        group.damage_sum += evaluated.damage_value;
    }

    /// Merge a shard that covers records after this one's.
    ///
    /// Scalars are summed and type groups merged key-wise. Labels first seen
    /// in `other` are appended in its order, so merging shards in input order
    /// keeps first-appearance order intact.
    pub fn merge(&mut self, other: Aggregator) {
        for i in 0..self.damage.len() {
            self.damage[i] += other.damage[i];
            self.original_damage[i] += other.original_damage[i];
        }
        self.at_risk_building_count += other.at_risk_building_count;
        self.at_risk_residential_units += other.at_risk_residential_units;
        self.commercial_at_risk_count += other.commercial_at_risk_count;
        self.commercial_units_at_risk += other.commercial_units_at_risk;
        self.record_count += other.record_count;

        for (label, acc) in other.types {
            match self.type_index.get(label.as_str()) {
                Some(&slot) => {
                    let group = &mut self.types[slot].1;
                    group.unit_sum += acc.unit_sum;
                    group.damage_sum += acc.damage_sum;
                }
                None => {
                    self.type_index.insert(label.clone(), self.types.len());
                    self.types.push((label, acc));
                }
            }
        }
    }

    /// Close the pass: derive totals and cut the type breakdown to the top five.
    pub fn finish(self) -> AggregateStats {
        let mut per_quintile_damage = [0.0; 5];
        per_quintile_damage.copy_from_slice(&self.damage[1..]);
        let unclassified_damage = self.damage[0];
        let total_damage = per_quintile_damage.iter().sum::<f64>() + unclassified_damage;
        let original_total_damage =
            self.original_damage[1..].iter().sum::<f64>() + self.original_damage[0];

        let mut groups = self.types;
        // stable: equal unit sums keep first-appearance order
        groups.sort_by(|a, b| b.1.unit_sum.cmp(&a.1.unit_sum));

        let mut top_type_breakdown: Vec<TypeGroup> = Vec::with_capacity(TOP_TYPE_GROUPS + 1);
        let mut remainder: Option<TypeGroup> = None;
        for (i, (label, acc)) in groups.into_iter().enumerate() {
            if i < TOP_TYPE_GROUPS {
                top_type_breakdown.push(TypeGroup {
                    label,
                    unit_sum: acc.unit_sum,
                    damage_sum: acc.damage_sum,
                    is_remainder: false,
                });
            } else {
                let other = remainder.get_or_insert_with(|| TypeGroup {
                    label: REMAINDER_LABEL.to_string(),
                    unit_sum: 0,
                    damage_sum: 0.0,
                    is_remainder: true,
                });
                other.unit_sum += acc.unit_sum;
                other.damage_sum += acc.damage_sum;
            }
        }
        top_type_breakdown.extend(remainder);

        AggregateStats {
            total_damage,
            original_total_damage,
            savings: original_total_damage - total_damage,
            at_risk_building_count: self.at_risk_building_count,
            at_risk_residential_units: self.at_risk_residential_units,
            commercial_at_risk_count: self.commercial_at_risk_count,
            commercial_units_at_risk: self.commercial_units_at_risk,
            per_quintile_damage,
            unclassified_damage,
            top_type_breakdown,
            record_count: self.record_count,
        }
    }
}

/// Fold a sequence of (record, evaluated) pairs in one pass.
pub fn aggregate<'a, I>(entries: I) -> AggregateStats
where
    I: IntoIterator<Item = (&'a BuildingRecord, &'a EvaluatedRecord)>,
{
    let mut aggregator = Aggregator::new();
    for (record, evaluated) in entries {
        aggregator.push(record, evaluated);
    }
    aggregator.finish()
}
