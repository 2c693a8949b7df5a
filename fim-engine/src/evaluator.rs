//! Per-record damage under a scenario and mitigation level.
//!
//! Damage is a step function of the depth class:
//!
//! | code | fraction of property value per residential unit |
//! |------|--------------------------------------------------|
//! | 0    | 0.00 |
//! | 1    | 0.25 |
//! | 2    | 0.40 |
//! | 3    | 0.75 |
//!
//! Raw codes above 3 are clamped to 3 before mitigation is subtracted.

use fim_model::{BuildingRecord, MitigationLevel, ScenarioParameters};
use serde::Serialize;

/// Highest defined severity band.
pub const MAX_DEPTH_CODE: u8 = 3;

/// Damage fraction indexed by depth code.
pub const DAMAGE_FRACTIONS: [f64; 4] = [0.0, 0.25, 0.40, 0.75];

/// Display class of a building under the current mitigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RiskBand {
    Safe,
    Low,
    Medium,
    High,
}

impl RiskBand {
    pub fn from_code(code: u8) -> RiskBand {
        match severity_band(code) {
            0 => RiskBand::Safe,
            1 => RiskBand::Low,
            2 => RiskBand::Medium,
            _ => RiskBand::High,
        }
    }
}

/// Derived values for one record, recomputed on every parameter change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluatedRecord {
    /// Depth code as loaded, before clamping or mitigation
    pub raw_depth_code: u8,
    pub mitigated_depth_code: u8,
    pub damage_value: f64,
    /// Damage with mitigation switched off
    pub original_damage_value: f64,
}

impl EvaluatedRecord {
    /// The building sits in the flood extent even if mitigation removed all damage.
    pub fn in_flood_extent(&self) -> bool {
        self.raw_depth_code > 0
    }

    pub fn risk_band(&self) -> RiskBand {
        RiskBand::from_code(self.mitigated_depth_code)
    }

    pub fn savings(&self) -> f64 {
        self.original_damage_value - self.damage_value
    }
}

/// Clamp a raw code to the defined bands.
pub fn severity_band(raw_code: u8) -> u8 {
    raw_code.min(MAX_DEPTH_CODE)
}

/// Band left after mitigation; never below 0 and never above the raw code.
pub fn mitigated_code(raw_code: u8, mitigation: MitigationLevel) -> u8 {
    severity_band(raw_code).saturating_sub(mitigation.get())
}

pub fn damage_fraction(code: u8) -> f64 {
    DAMAGE_FRACTIONS[severity_band(code) as usize]
}

/// Damage for a record at a given (already mitigated) depth code.
pub fn damage_for_code(record: &BuildingRecord, code: u8) -> f64 {
    if code == 0 {
        return 0.0;
    }
    record.property_value * damage_fraction(code) * f64::from(record.residential_units)
}

/// Evaluate a record. Pure and total: identical inputs give bit-identical outputs.
pub fn evaluate(record: &BuildingRecord, params: ScenarioParameters) -> EvaluatedRecord {
    let raw = record.raw_depth_code(params.scenario);
    let mitigated = mitigated_code(raw, params.mitigation);
    let original = mitigated_code(raw, MitigationLevel::NONE);
    EvaluatedRecord {
        raw_depth_code: raw,
        mitigated_depth_code: mitigated,
        damage_value: damage_for_code(record, mitigated),
        original_damage_value: damage_for_code(record, original),
    }
}
