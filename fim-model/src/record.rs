use crate::geometry::Location;
use crate::quintile::Quintile;
use crate::scenario::Scenario;
use crate::usage::UseClass;
use serde::{Deserialize, Serialize};

/// Label used when a record carries no type description.
pub const DEFAULT_TYPE_LABEL: &str = "Other";

/// Raw depth class per scenario, built once at load time.
///
/// 0 = outside the flood extent, 1..=3 = increasing severity. Values above 3
/// are kept as loaded; the evaluator clamps them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DepthCodes {
    pub high: u8,
    pub medium: u8,
    pub low: u8,
}

impl DepthCodes {
    pub fn new(high: u8, medium: u8, low: u8) -> Self {
        Self { high, medium, low }
    }

    pub fn get(&self, scenario: Scenario) -> u8 {
        match scenario {
            Scenario::High => self.high,
            Scenario::Medium => self.medium,
            Scenario::Low => self.low,
        }
    }

    pub fn set(&mut self, scenario: Scenario, code: u8) {
        match scenario {
            Scenario::High => self.high = code,
            Scenario::Medium => self.medium = code,
            Scenario::Low => self.low = code,
        }
    }
}

/// One building from the dataset. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    /// OS building identifier (`osid`)
    pub id: String,
    pub location: Location,
    /// Average residential unit price for the postcode sector
    pub property_value: f64,
    pub residential_units: u32,
    pub commercial_units: u32,
    pub use_class: UseClass,
    pub quintile: Quintile,
    /// Building type description used for grouping
    pub type_label: String,
    pub depth_codes: DepthCodes,
    /// Passed through for display only
    pub zone_name: Option<String>,
    /// Passed through for display only
    pub postcode_sector: Option<String>,
}

impl BuildingRecord {
    /// A record with every optional field at its load-time default.
    pub fn new(id: impl Into<String>, location: Location, property_value: f64) -> Self {
        Self {
            id: id.into(),
            location,
            property_value,
            residential_units: 0,
            commercial_units: 0,
            use_class: UseClass::Other,
            quintile: Quintile::UNKNOWN,
            type_label: DEFAULT_TYPE_LABEL.to_string(),
            depth_codes: DepthCodes::default(),
            zone_name: None,
            postcode_sector: None,
        }
    }

    pub fn raw_depth_code(&self, scenario: Scenario) -> u8 {
        self.depth_codes.get(scenario)
    }

    /// Inside the modelled flood extent for the scenario, whatever the mitigation.
    pub fn in_flood_extent(&self, scenario: Scenario) -> bool {
        self.raw_depth_code(scenario) > 0
    }
}
