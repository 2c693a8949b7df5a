//! Planar (longitude, latitude) coordinates and GeoJSON polygon parsing.
//!
//! Coordinates are treated as a flat plane; at city scale the geodesic error
//! is far below the resolution of the flood maps.

use crate::error::GeometryError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A WGS84 position in GeoJSON axis order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lon: f64,
    pub lat: f64,
}

impl Location {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

impl From<(f64, f64)> for Location {
    fn from((lon, lat): (f64, f64)) -> Self {
        Location { lon, lat }
    }
}

/// Read a `[lon, lat, ...]` position array.
pub fn position_from_json(value: &Value) -> Option<Location> {
    let coords = value.as_array()?;
    let lon = coords.first()?.as_f64()?;
    let lat = coords.get(1)?.as_f64()?;
    Some(Location::new(lon, lat))
}

/// Extract the outer ring of a drawn filter polygon.
///
/// Accepts a bare `Polygon` geometry, a `Feature` wrapping one, or a
/// `FeatureCollection` whose first feature is a polygon. Holes are ignored,
/// matching a lasso drawn on the map. The vertices are returned as given;
/// validation happens when the ring is built for containment tests.
pub fn polygon_ring_from_geojson(value: &Value) -> Result<Vec<Location>, GeometryError> {
    let kind = value.get("type").and_then(Value::as_str).unwrap_or("");
    match kind {
        "Polygon" => {
            let rings = value
                .get("coordinates")
                .and_then(Value::as_array)
                .ok_or_else(|| GeometryError::Unsupported("Polygon without coordinates".into()))?;
            let outer = rings
                .first()
                .and_then(Value::as_array)
                .ok_or_else(|| GeometryError::Unsupported("Polygon without an outer ring".into()))?;
            outer
                .iter()
                .map(|p| {
                    position_from_json(p)
                        .ok_or_else(|| GeometryError::Unsupported(format!("bad position {}", p)))
                })
                .collect()
        }
        "Feature" => {
            let geometry = value
                .get("geometry")
                .ok_or_else(|| GeometryError::Unsupported("Feature without geometry".into()))?;
            polygon_ring_from_geojson(geometry)
        }
        "FeatureCollection" => {
            let first = value
                .get("features")
                .and_then(Value::as_array)
                .and_then(|f| f.first())
                .ok_or_else(|| GeometryError::Unsupported("empty FeatureCollection".into()))?;
            polygon_ring_from_geojson(first)
        }
        other => Err(GeometryError::Unsupported(format!(
            "geometry type `{}`",
            other
        ))),
    }
}
