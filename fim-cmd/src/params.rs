//! Recompute parameters from a JSON file and command-line flags.
//!
//! The file is read first; each flag given on the command line then replaces
//! the matching value. Anything left unset keeps the dashboard defaults.

use anyhow::Context;
use clap::Args;
use fim_model::geometry::polygon_ring_from_geojson;
use fim_model::{MitigationLevel, QuintileSet, RecomputeParams, Scenario, UsageSet, UseClass};

#[derive(Args, Debug, Clone, Default)]
pub struct ParamArgs {
    /// JSON parameters file (`scenario`, `mitigation_level`, `criteria`)
    #[arg(long)]
    pub params: Option<String>,

    /// Scenario: H, M or L
    #[arg(short, long)]
    pub scenario: Option<Scenario>,

    /// Mitigation level, 0 to 2
    #[arg(short, long)]
    pub mitigation: Option<u8>,

    /// Comma-separated quintiles, e.g. 1,2,3
    #[arg(short, long, value_delimiter = ',')]
    pub quintiles: Vec<u8>,

    /// Comma-separated use classes, e.g. residential,mixed
    #[arg(short, long, value_delimiter = ',')]
    pub usages: Vec<UseClass>,

    /// GeoJSON file holding the lasso polygon
    #[arg(long)]
    pub polygon: Option<String>,

    /// Ignore any polygon from the parameters file
    #[arg(long, conflicts_with = "polygon")]
    pub no_polygon: bool,
}

impl ParamArgs {
    /// Merge the parameters file and the flags.
    pub fn resolve(&self) -> anyhow::Result<RecomputeParams> {
        let mut params = match &self.params {
            Some(path) => {
                let text = fim_utils::input::read_dataset(path)?;
                serde_json::from_str::<RecomputeParams>(&text)
                    .with_context(|| format!("invalid parameters file {}", path))?
            }
            None => RecomputeParams::default(),
        };

        if let Some(scenario) = self.scenario {
            params.scenario.scenario = scenario;
        }
        if let Some(level) = self.mitigation {
            params.scenario.mitigation = MitigationLevel::new(level)?;
        }
        if !self.quintiles.is_empty() {
            params.criteria.quintiles = QuintileSet::from_ranks(self.quintiles.iter().copied())?;
        }
        if !self.usages.is_empty() {
            params.criteria.usages = self.usages.iter().copied().collect::<UsageSet>();
        }
        if let Some(path) = &self.polygon {
            params.criteria.polygon = Some(read_polygon(path)?);
        } else if self.no_polygon {
            params.criteria.polygon = None;
        }
        params.criteria.validate()?;

        log::info!(
            "[FIM] cmd: scenario {} mitigation {} quintiles {:?} usages {:?} polygon {}",
            params.scenario.scenario,
            params.scenario.mitigation.get(),
            params.criteria.quintiles.ranks().collect::<Vec<_>>(),
            params.criteria.usages.iter().map(UseClass::as_str).collect::<Vec<_>>(),
            params.criteria.polygon.as_ref().map_or(0, Vec::len)
        );
        Ok(params)
    }
}

/// Read the outer ring of a lasso polygon file.
pub fn read_polygon(path: &str) -> anyhow::Result<Vec<fim_model::Location>> {
    let text = fim_utils::input::read_dataset(path)?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("invalid GeoJSON in {}", path))?;
    let ring = polygon_ring_from_geojson(&value)
        .with_context(|| format!("no polygon found in {}", path))?;
    Ok(ring)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fim-cmd-params-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_no_flags_gives_defaults() {
        let params = ParamArgs::default().resolve().unwrap();
        assert_eq!(params, RecomputeParams::default());
        assert_eq!(params.scenario.scenario, Scenario::Medium);
        assert!(params.criteria.quintiles.is_full());
        assert_eq!(params.criteria.usages, UsageSet::default());
    }

    #[test]
    fn test_flags_set_values() {
        let args = ParamArgs {
            scenario: Some(Scenario::High),
            mitigation: Some(2),
            quintiles: vec![1, 2],
            usages: vec![UseClass::Commercial],
            ..ParamArgs::default()
        };
        let params = args.resolve().unwrap();
        assert_eq!(params.scenario.scenario, Scenario::High);
        assert_eq!(params.scenario.mitigation.get(), 2);
        assert_eq!(params.criteria.quintiles.ranks().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(params.criteria.usages.iter().collect::<Vec<_>>(), vec![UseClass::Commercial]);
    }

    #[test]
    fn test_out_of_range_flags_fail() {
        let args = ParamArgs {
            mitigation: Some(3),
            ..ParamArgs::default()
        };
        assert!(args.resolve().is_err());

        let args = ParamArgs {
            quintiles: vec![6],
            ..ParamArgs::default()
        };
        assert!(args.resolve().is_err());
    }

    #[test]
    fn test_empty_selection_in_file_fails() {
        let dir = scratch("empty");
        let file = dir.join("params.json");
        std::fs::write(&file, r#"{"scenario": "H", "criteria": {"quintiles": []}}"#).unwrap();
        let args = ParamArgs {
            params: Some(file.to_string_lossy().into_owned()),
            ..ParamArgs::default()
        };
        assert!(args.resolve().is_err());

        let rescued = ParamArgs {
            params: Some(file.to_string_lossy().into_owned()),
            quintiles: vec![2],
            ..ParamArgs::default()
        };
        assert!(rescued.resolve().is_ok());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_flags_override_file() {
        let dir = scratch("override");
        let file = dir.join("params.json");
        std::fs::write(
            &file,
            r#"{"scenario": "L", "mitigation_level": 1, "criteria": {"quintiles": [4], "polygon": [{"lon": 0.0, "lat": 0.0}, {"lon": 1.0, "lat": 0.0}, {"lon": 0.0, "lat": 1.0}]}}"#,
        )
        .unwrap();

        let args = ParamArgs {
            params: Some(file.to_string_lossy().into_owned()),
            mitigation: Some(0),
            ..ParamArgs::default()
        };
        let params = args.resolve().unwrap();
        assert_eq!(params.scenario.scenario, Scenario::Low);
        assert_eq!(params.scenario.mitigation.get(), 0);
        assert_eq!(params.criteria.quintiles.ranks().collect::<Vec<_>>(), vec![4]);
        assert_eq!(params.criteria.polygon.as_ref().map(Vec::len), Some(3));

        let cleared = ParamArgs {
            params: Some(file.to_string_lossy().into_owned()),
            no_polygon: true,
            ..ParamArgs::default()
        };
        assert!(cleared.resolve().unwrap().criteria.polygon.is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_polygon_from_geojson_feature() {
        let dir = scratch("polygon");
        let file = dir.join("lasso.geojson");
        std::fs::write(
            &file,
            r#"{"type": "Feature", "properties": {}, "geometry": {"type": "Polygon", "coordinates": [[[-3.2, 55.9], [-3.1, 55.9], [-3.1, 56.0], [-3.2, 55.9]]]}}"#,
        )
        .unwrap();
        let args = ParamArgs {
            polygon: Some(file.to_string_lossy().into_owned()),
            ..ParamArgs::default()
        };
        let params = args.resolve().unwrap();
        let ring = params.criteria.polygon.unwrap();
        assert_eq!(ring.len(), 4);
        assert_eq!(ring[0], fim_model::Location::new(-3.2, 55.9));

        std::fs::write(&file, r#"{"type": "Point", "coordinates": [0, 0]}"#).unwrap();
        assert!(read_polygon(&file.to_string_lossy()).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
