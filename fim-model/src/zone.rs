//! Deprivation-zone (SIMD data zone) layer.
//!
//! Zones arrive with pre-aggregated damage and units-at-risk per scenario.
//! These totals are displayed as-is and never recomputed from building records.

use crate::criteria::FilterCriteria;
use crate::error::DataFormatError;
use crate::geometry::{polygon_ring_from_geojson, Location};
use crate::quintile::Quintile;
use crate::scenario::Scenario;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Damage thresholds (currency) between shade classes.
pub const DAMAGE_SHADE_THRESHOLDS: [f64; 3] = [5_000_000.0, 20_000_000.0, 50_000_000.0];

/// Units-at-risk thresholds between shade classes.
pub const UNITS_SHADE_THRESHOLDS: [f64; 3] = [10.0, 50.0, 100.0];

/// Which pre-aggregated value drives the zone colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadeMode {
    #[default]
    Damage,
    Units,
}

/// Ordinal shade class for a zone, lightest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ZoneShade {
    Base,
    Light,
    Medium,
    Dark,
}

impl ZoneShade {
    /// Values strictly above a threshold move up one class.
    pub fn classify(value: f64, thresholds: &[f64; 3]) -> ZoneShade {
        match thresholds.iter().filter(|t| value > **t).count() {
            0 => ZoneShade::Base,
            1 => ZoneShade::Light,
            2 => ZoneShade::Medium,
            _ => ZoneShade::Dark,
        }
    }
}

/// Per-scenario triple keyed like the dataset's `_h`, `_m`, `_l` suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ByScenario {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl ByScenario {
    pub fn get(&self, scenario: Scenario) -> f64 {
        match scenario {
            Scenario::High => self.high,
            Scenario::Medium => self.medium,
            Scenario::Low => self.low,
        }
    }
}

/// One data zone with its display-only aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub data_zone: String,
    pub name: String,
    pub quintile: Quintile,
    pub total_units: f64,
    pub damage: ByScenario,
    pub units_at_risk: ByScenario,
    pub avg_property_value: f64,
    /// Outer ring, when the feature carried a polygon
    pub ring: Option<Vec<Location>>,
}

impl Zone {
    pub fn shade(&self, scenario: Scenario, mode: ShadeMode) -> ZoneShade {
        match mode {
            ShadeMode::Damage => ZoneShade::classify(self.damage.get(scenario), &DAMAGE_SHADE_THRESHOLDS),
            ShadeMode::Units => {
                ZoneShade::classify(self.units_at_risk.get(scenario), &UNITS_SHADE_THRESHOLDS)
            }
        }
    }
}

/// Read-only collection of zones.
#[derive(Debug, Clone, Default)]
pub struct ZoneStore {
    zones: Vec<Zone>,
}

impl ZoneStore {
    pub fn from_geojson_str(document: &str) -> Result<ZoneStore, DataFormatError> {
        let value: Value = serde_json::from_str(document)
            .map_err(|e| DataFormatError::InvalidDocument(e.to_string()))?;
        let features = value
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| DataFormatError::InvalidDocument("missing `features` array".into()))?;

        let mut zones = Vec::with_capacity(features.len());
        let mut dropped = 0usize;
        for feature in features {
            match parse_zone(feature) {
                Ok(zone) => zones.push(zone),
                Err(e) => {
                    log::debug!("[FIM] zones: dropped zone: {}", e);
                    dropped += 1;
                }
            }
        }
        log::info!("[FIM] zones: Loaded {} zones, dropped {}", zones.len(), dropped);
        Ok(ZoneStore { zones })
    }

    pub fn from_zones(zones: Vec<Zone>) -> ZoneStore {
        ZoneStore { zones }
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Zones shown under the current quintile selection.
    pub fn visible_zones<'a>(&'a self, criteria: &'a FilterCriteria) -> impl Iterator<Item = &'a Zone> + 'a {
        self.zones
            .iter()
            .filter(move |z| criteria.quintiles.contains(z.quintile))
    }
}

fn parse_zone(feature: &Value) -> Result<Zone, DataFormatError> {
    let props = feature
        .get("properties")
        .and_then(Value::as_object)
        .ok_or(DataFormatError::MissingField("properties"))?;
    let data_zone = props
        .get("DataZone")
        .and_then(Value::as_str)
        .ok_or(DataFormatError::MissingField("DataZone"))?
        .to_string();
    let number = |key: &str| props.get(key).and_then(Value::as_f64).unwrap_or(0.0);
    let quintile = props
        .get("Quintilev2")
        .and_then(Value::as_u64)
        .and_then(|q| u8::try_from(q).ok())
        .and_then(Quintile::new)
        .unwrap_or(Quintile::UNKNOWN);
    let ring = feature
        .get("geometry")
        .filter(|g| !g.is_null())
        .and_then(|g| polygon_ring_from_geojson(g).ok());

    Ok(Zone {
        name: props
            .get("DZName")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string(),
        data_zone,
        quintile,
        total_units: number("total_units"),
        damage: ByScenario {
            high: number("zone_damage_h"),
            medium: number("zone_damage_m"),
            low: number("zone_damage_l"),
        },
        units_at_risk: ByScenario {
            high: number("units_risk_h"),
            medium: number("units_risk_m"),
            low: number("units_risk_l"),
        },
        avg_property_value: number("avg_property_val"),
        ring,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quintile::QuintileSet;
    use serde_json::json;

    const ZONES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature",
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]},
             "properties": {"DataZone": "S01008417", "DZName": "Leith - 01", "Quintilev2": 1,
                            "total_units": 800, "zone_damage_h": 1000000, "zone_damage_m": 25000000,
                            "zone_damage_l": 60000000, "units_risk_h": 5, "units_risk_m": 30,
                            "units_risk_l": 120, "avg_property_val": 180000.5}},
            {"type": "Feature", "geometry": null,
             "properties": {"DataZone": "S01008999", "Quintilev2": 4}},
            {"type": "Feature", "geometry": null, "properties": {"DZName": "nameless"}}
        ]
    }"#;

    #[test]
    fn test_load_zones() {
        let store = ZoneStore::from_geojson_str(ZONES).unwrap();
        assert_eq!(store.len(), 2);
        let leith = &store.zones()[0];
        assert_eq!(leith.name, "Leith - 01");
        assert_eq!(leith.quintile.get(), 1);
        assert_eq!(leith.ring.as_ref().map(Vec::len), Some(4));
        assert_eq!(store.zones()[1].name, "Unknown");
        assert_eq!(store.zones()[1].damage, ByScenario::default());
    }

    #[test]
    fn test_zone_shades() {
        let store = ZoneStore::from_geojson_str(ZONES).unwrap();
        let leith = &store.zones()[0];
        assert_eq!(leith.shade(Scenario::High, ShadeMode::Damage), ZoneShade::Base);
        assert_eq!(leith.shade(Scenario::Medium, ShadeMode::Damage), ZoneShade::Medium);
        assert_eq!(leith.shade(Scenario::Low, ShadeMode::Damage), ZoneShade::Dark);
        assert_eq!(leith.shade(Scenario::High, ShadeMode::Units), ZoneShade::Base);
        assert_eq!(leith.shade(Scenario::Medium, ShadeMode::Units), ZoneShade::Light);
        assert_eq!(leith.shade(Scenario::Low, ShadeMode::Units), ZoneShade::Dark);
        assert_eq!(ZoneShade::classify(10.0, &UNITS_SHADE_THRESHOLDS), ZoneShade::Base);
    }

    #[test]
    fn test_visible_zones_follow_quintile_selection() {
        let store = ZoneStore::from_geojson_str(ZONES).unwrap();
        let criteria = FilterCriteria {
            quintiles: QuintileSet::from_ranks([4, 5]).unwrap(),
            ..FilterCriteria::default()
        };
        let visible: Vec<_> = store.visible_zones(&criteria).map(|z| z.data_zone.as_str()).collect();
        assert_eq!(visible, vec!["S01008999"]);
        assert_eq!(store.visible_zones(&FilterCriteria::everything()).count(), 2);
    }

    #[test]
    fn test_zone_requires_collection() {
        assert!(ZoneStore::from_geojson_str(&json!({"type": "Feature"}).to_string()).is_err());
    }
}
