//! GeoJSON map layer of buildings inside the flood extent.

use crate::params::ParamArgs;
use fim_engine::{map_layer, Recomputation, RiskBand};
use log::info;
use serde_json::{json, Value};

fn band_name(band: RiskBand) -> &'static str {
    match band {
        RiskBand::Safe => "Safe",
        RiskBand::Low => "Low",
        RiskBand::Medium => "Medium",
        RiskBand::High => "High",
    }
}

/// Point features for every included building with a raw depth code above zero.
pub fn layer_geojson(result: &Recomputation<'_>) -> Value {
    let features: Vec<Value> = map_layer(result)
        .map(|f| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [f.location.lon, f.location.lat],
                },
                "properties": {
                    "osid": f.id,
                    "depth_code": f.mitigated_depth_code,
                    "damage": f.damage_value,
                    "risk": band_name(f.risk_band),
                },
            })
        })
        .collect();
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

pub fn run_layer(dataset: &str, args: &ParamArgs, output: &str) -> anyhow::Result<()> {
    let store = crate::load_store(dataset)?;
    let params = args.resolve()?;
    let result = crate::report::recompute(&store, &params);
    let layer = layer_geojson(&result);
    let count = layer["features"].as_array().map_or(0, Vec::len);

    std::fs::write(output, serde_json::to_string(&layer)?)?;
    info!("Layer written to {} ({} buildings)", output, count);
    Ok(())
}
