//! GeoJSON loading into an immutable [`RecordStore`].
//!
//! The dataset is a FeatureCollection of building centroids produced by the
//! preprocessing pipeline. Every feature is checked against a strict schema:
//!
//! - **Required**: `osid`, a `Point` geometry, `property_value`
//! - **Defaulted**: `residential_units` (0), `buildinguse_addresscount_commercial` (0),
//!   `use_class` (Other), `quintile` (0), `description` ("Other"),
//!   `gridcode_h` / `gridcode_m` / `gridcode_l` (0)
//! - **Passed through**: `zone_name`, `postcode_sector`
//!
//! Features that fail the schema are dropped and counted in the [`LoadReport`].

use crate::error::DataFormatError;
use crate::geometry::{position_from_json, Location};
use crate::quintile::Quintile;
use crate::record::{BuildingRecord, DepthCodes, DEFAULT_TYPE_LABEL};
use crate::scenario::Scenario;
use crate::usage::UseClass;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Counts gathered while loading a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub dropped: usize,
    /// Number of individual fields that fell back to their default
    pub defaulted_fields: usize,
}

/// Read-only snapshot of building records for one session.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<BuildingRecord>,
    index: HashMap<String, usize>,
    report: LoadReport,
}

impl RecordStore {
    /// Parse a GeoJSON FeatureCollection document.
    ///
    /// Only a document that is not a FeatureCollection fails; bad features are
    /// dropped and counted.
    pub fn from_geojson_str(document: &str) -> Result<RecordStore, DataFormatError> {
        let value: Value = serde_json::from_str(document)
            .map_err(|e| DataFormatError::InvalidDocument(e.to_string()))?;
        RecordStore::from_geojson_value(&value)
    }

    pub fn from_geojson_value(document: &Value) -> Result<RecordStore, DataFormatError> {
        match document.get("type").and_then(Value::as_str) {
            Some("FeatureCollection") => {}
            other => {
                return Err(DataFormatError::InvalidDocument(format!(
                    "expected a FeatureCollection, found {:?}",
                    other
                )))
            }
        }
        let features = document
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| DataFormatError::InvalidDocument("missing `features` array".into()))?;
        Ok(load_records(features))
    }

    /// Build a store from already-typed records. Later duplicates of an id are dropped.
    pub fn from_records(records: impl IntoIterator<Item = BuildingRecord>) -> RecordStore {
        let mut store = RecordStore::default();
        for record in records {
            if let Err(e) = store.push(record) {
                log::debug!("[FIM] loader: dropped record: {}", e);
                store.report.dropped += 1;
            }
        }
        store
    }

    fn push(&mut self, record: BuildingRecord) -> Result<(), DataFormatError> {
        if self.index.contains_key(&record.id) {
            return Err(DataFormatError::DuplicateId(record.id));
        }
        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record);
        self.report.loaded += 1;
        Ok(())
    }

    pub fn records(&self) -> &[BuildingRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BuildingRecord> {
        self.records.iter()
    }

    pub fn get(&self, id: &str) -> Option<&BuildingRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a BuildingRecord;
    type IntoIter = std::slice::Iter<'a, BuildingRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Load raw features into a store, dropping and counting the ones that fail.
pub fn load_records(features: &[Value]) -> RecordStore {
    let mut store = RecordStore::default();
    for (position, feature) in features.iter().enumerate() {
        let outcome = parse_feature(feature).and_then(|(record, defaulted)| {
            store.push(record)?;
            Ok(defaulted)
        });
        match outcome {
            Ok(defaulted) => store.report.defaulted_fields += defaulted,
            Err(e) => {
                log::debug!("[FIM] loader: dropped feature #{}: {}", position, e);
                store.report.dropped += 1;
            }
        }
    }
    log::info!(
        "[FIM] loader: Loaded {} records, dropped {}, defaulted {} fields",
        store.report.loaded,
        store.report.dropped,
        store.report.defaulted_fields
    );
    store
}

/// Parse one GeoJSON feature, returning the record and how many fields were defaulted.
pub fn parse_feature(feature: &Value) -> Result<(BuildingRecord, usize), DataFormatError> {
    let empty = Map::new();
    let props = match feature.get("properties") {
        Some(Value::Object(map)) => map,
        Some(Value::Null) | None => &empty,
        Some(_) => {
            return Err(DataFormatError::InvalidField {
                field: "properties",
                reason: "not an object".into(),
            })
        }
    };
    let mut defaulted = 0usize;

    let id = match props.get("osid").or_else(|| feature.get("id")) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(DataFormatError::MissingField("osid")),
    };

    let location = point_location(feature.get("geometry"))?;

    let property_value = number_field(props, "property_value")?
        .ok_or(DataFormatError::MissingField("property_value"))?;
    if property_value < 0.0 {
        return Err(DataFormatError::InvalidField {
            field: "property_value",
            reason: format!("negative value {}", property_value),
        });
    }

    let residential_units = count_field(props, "residential_units", &mut defaulted)?;
    let commercial_units =
        count_field(props, "buildinguse_addresscount_commercial", &mut defaulted)?;

    let use_class = match props.get("use_class") {
        Some(Value::String(s)) => UseClass::from_dataset(Some(s)),
        _ => {
            defaulted += 1;
            UseClass::Other
        }
    };

    let quintile = match number_field(props, "quintile").ok().flatten() {
        Some(q) if q.fract() == 0.0 && (0.0..=5.0).contains(&q) => {
            Quintile::new(q as u8).unwrap_or(Quintile::UNKNOWN)
        }
        _ => {
            defaulted += 1;
            Quintile::UNKNOWN
        }
    };

    let type_label = match props.get("description") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => {
            defaulted += 1;
            DEFAULT_TYPE_LABEL.to_string()
        }
    };

    let mut depth_codes = DepthCodes::default();
    for scenario in Scenario::ALL {
        let key = gridcode_key(scenario);
        match number_field(props, key).ok().flatten() {
            Some(code) => depth_codes.set(scenario, depth_code(code)),
            None => defaulted += 1,
        }
    }

    let record = BuildingRecord {
        id,
        location,
        property_value,
        residential_units,
        commercial_units,
        use_class,
        quintile,
        type_label,
        depth_codes,
        zone_name: text_field(props, "zone_name"),
        postcode_sector: text_field(props, "postcode_sector"),
    };
    Ok((record, defaulted))
}

impl TryFrom<&Value> for BuildingRecord {
    type Error = DataFormatError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        parse_feature(value).map(|(record, _)| record)
    }
}

/// Property key holding the raw depth class for a scenario.
pub fn gridcode_key(scenario: Scenario) -> &'static str {
    match scenario {
        Scenario::High => "gridcode_h",
        Scenario::Medium => "gridcode_m",
        Scenario::Low => "gridcode_l",
    }
}

fn point_location(geometry: Option<&Value>) -> Result<Location, DataFormatError> {
    let geometry = match geometry {
        Some(g) if !g.is_null() => g,
        _ => return Err(DataFormatError::MissingField("geometry")),
    };
    match geometry.get("type").and_then(Value::as_str) {
        Some("Point") => {}
        other => {
            return Err(DataFormatError::InvalidGeometry(format!(
                "expected Point, found {:?}",
                other
            )))
        }
    }
    let location = geometry
        .get("coordinates")
        .and_then(position_from_json)
        .ok_or_else(|| DataFormatError::InvalidGeometry("coordinates are not [lon, lat]".into()))?;
    if !location.is_finite() {
        return Err(DataFormatError::InvalidGeometry("non-finite coordinate".into()));
    }
    Ok(location)
}

/// Numeric property; numeric strings are accepted, null/absent is `None`.
fn number_field(props: &Map<String, Value>, field: &'static str) -> Result<Option<f64>, DataFormatError> {
    let parsed = match props.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(DataFormatError::InvalidField {
            field,
            reason: "not a finite number".into(),
        }),
    }
}

fn count_field(
    props: &Map<String, Value>,
    field: &'static str,
    defaulted: &mut usize,
) -> Result<u32, DataFormatError> {
    match number_field(props, field)? {
        Some(v) if v < 0.0 => Err(DataFormatError::InvalidField {
            field,
            reason: format!("negative count {}", v),
        }),
        Some(v) => Ok(v.round().min(u32::MAX as f64) as u32),
        None => {
            *defaulted += 1;
            Ok(0)
        }
    }
}

/// Negative codes mean "not flooded"; fractional codes round down.
fn depth_code(value: f64) -> u8 {
    value.floor().clamp(0.0, u8::MAX as f64) as u8
}

fn text_field(props: &Map<String, Value>, field: &str) -> Option<String> {
    match props.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(osid: &str, props: Value) -> Value {
        let mut props = props;
        props["osid"] = json!(osid);
        json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [-3.19, 55.95]},
            "properties": props
        })
    }

    #[test]
    fn test_load_full_feature() {
        let f = feature(
            "a1",
            json!({
                "property_value": 200000.0,
                "residential_units": 4,
                "buildinguse_addresscount_commercial": 1.0,
                "use_class": "Mixed",
                "quintile": 2,
                "description": "Tenement",
                "gridcode_h": 0,
                "gridcode_m": 2.0,
                "gridcode_l": 3,
                "zone_name": "Leith - 03",
                "postcode_sector": "EH6 6"
            }),
        );
        let (record, defaulted) = parse_feature(&f).unwrap();
        assert_eq!(defaulted, 0);
        assert_eq!(record.id, "a1");
        assert_eq!(record.location, Location::new(-3.19, 55.95));
        assert_eq!(record.residential_units, 4);
        assert_eq!(record.commercial_units, 1);
        assert_eq!(record.use_class, UseClass::Mixed);
        assert_eq!(record.quintile.get(), 2);
        assert_eq!(record.type_label, "Tenement");
        assert_eq!(record.depth_codes, DepthCodes::new(0, 2, 3));
        assert_eq!(record.zone_name.as_deref(), Some("Leith - 03"));
        assert_eq!(record.postcode_sector.as_deref(), Some("EH6 6"));
    }

    #[test]
    fn test_load_applies_defaults() {
        let f = feature("b2", json!({"property_value": 100.0, "use_class": "Warehouse"}));
        let (record, defaulted) = parse_feature(&f).unwrap();
        assert_eq!(record.residential_units, 0);
        assert_eq!(record.commercial_units, 0);
        assert_eq!(record.use_class, UseClass::Other);
        assert_eq!(record.quintile, Quintile::UNKNOWN);
        assert_eq!(record.type_label, "Other");
        assert_eq!(record.depth_codes, DepthCodes::default());
        // units x2, quintile, description, three gridcodes
        assert_eq!(defaulted, 7);

        let lower = feature("b3", json!({"property_value": 100.0, "use_class": "residential"}));
        assert_eq!(parse_feature(&lower).unwrap().0.use_class, UseClass::Other);
    }

    #[test]
    fn test_load_rejects_missing_required_fields() {
        let no_value = feature("c3", json!({}));
        assert_eq!(
            parse_feature(&no_value).unwrap_err(),
            DataFormatError::MissingField("property_value")
        );

        let no_id = json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [0.0, 0.0]},
            "properties": {"property_value": 1.0}
        });
        assert_eq!(parse_feature(&no_id).unwrap_err(), DataFormatError::MissingField("osid"));

        let no_geometry = json!({
            "type": "Feature",
            "geometry": null,
            "properties": {"osid": "d4", "property_value": 1.0}
        });
        assert_eq!(
            parse_feature(&no_geometry).unwrap_err(),
            DataFormatError::MissingField("geometry")
        );
    }

    #[test]
    fn test_load_rejects_bad_values() {
        let negative = feature("e5", json!({"property_value": -5.0}));
        assert!(matches!(
            parse_feature(&negative),
            Err(DataFormatError::InvalidField { field: "property_value", .. })
        ));
        let text_units = feature("e6", json!({"property_value": 5.0, "residential_units": "many"}));
        assert!(matches!(
            parse_feature(&text_units),
            Err(DataFormatError::InvalidField { field: "residential_units", .. })
        ));
    }

    #[test]
    fn test_load_records_counts_dropped_and_duplicates() {
        let features = vec![
            feature("x", json!({"property_value": 1.0})),
            feature("x", json!({"property_value": 2.0})),
            feature("y", json!({})),
            feature("z", json!({"property_value": "3"})),
        ];
        let store = load_records(&features);
        assert_eq!(store.len(), 2);
        assert_eq!(store.report().loaded, 2);
        assert_eq!(store.report().dropped, 2);
        assert_eq!(store.get("x").map(|r| r.property_value), Some(1.0));
        assert_eq!(store.get("z").map(|r| r.property_value), Some(3.0));
    }

    #[test]
    fn test_from_geojson_str_requires_feature_collection() {
        assert!(matches!(
            RecordStore::from_geojson_str("{\"type\": \"Feature\"}"),
            Err(DataFormatError::InvalidDocument(_))
        ));
        assert!(RecordStore::from_geojson_str("not json").is_err());

        let doc = json!({
            "type": "FeatureCollection",
            "features": [feature("k", json!({"property_value": 10.0, "gridcode_h": 999}))]
        });
        let store = RecordStore::from_geojson_str(&doc.to_string()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].depth_codes.high, 255);
    }

    #[test]
    fn test_numeric_osid_is_accepted() {
        let f = json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
            "properties": {"osid": 1234, "property_value": 1.0, "gridcode_m": -1}
        });
        let record = BuildingRecord::try_from(&f).unwrap();
        assert_eq!(record.id, "1234");
        assert_eq!(record.depth_codes.medium, 0);
    }
}
