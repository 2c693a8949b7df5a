//! CSV export of the filtered, evaluated buildings.

use crate::params::ParamArgs;
use fim_engine::{EvaluatedEntry, Recomputation};
use log::info;
use serde::Serialize;
use std::io;

#[derive(Debug, Serialize)]
pub struct ExportRow<'a> {
    pub osid: &'a str,
    pub lon: f64,
    pub lat: f64,
    pub use_class: &'static str,
    pub quintile: u8,
    pub type_label: &'a str,
    pub zone_name: Option<&'a str>,
    pub postcode_sector: Option<&'a str>,
    pub raw_depth_code: u8,
    pub mitigated_depth_code: u8,
    pub damage: f64,
    pub original_damage: f64,
}

impl<'a> From<&EvaluatedEntry<'a>> for ExportRow<'a> {
    fn from(entry: &EvaluatedEntry<'a>) -> Self {
        let record = entry.record;
        ExportRow {
            osid: &record.id,
            lon: record.location.lon,
            lat: record.location.lat,
            use_class: record.use_class.as_str(),
            quintile: record.quintile.get(),
            type_label: &record.type_label,
            zone_name: record.zone_name.as_deref(),
            postcode_sector: record.postcode_sector.as_deref(),
            raw_depth_code: entry.evaluated.raw_depth_code,
            mitigated_depth_code: entry.evaluated.mitigated_depth_code,
            damage: entry.evaluated.damage_value,
            original_damage: entry.evaluated.original_damage_value,
        }
    }
}

/// Write one CSV row per included building, with a header row.
pub fn write_csv<W: io::Write>(writer: W, result: &Recomputation<'_>) -> anyhow::Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    for entry in &result.records {
        wtr.serialize(ExportRow::from(entry))?;
    }
    wtr.flush()?;
    Ok(result.records.len())
}

pub fn run_export(dataset: &str, args: &ParamArgs, output: &str) -> anyhow::Result<()> {
    let store = crate::load_store(dataset)?;
    let params = args.resolve()?;
    let result = crate::report::recompute(&store, &params);
    if let Some(e) = &result.geometry_error {
        log::warn!("[FIM] export: polygon rejected, nothing exported: {}", e);
    }

    let file = std::fs::File::create(output)?;
    let rows = write_csv(io::BufWriter::new(file), &result)?;
    info!("Export complete. {} buildings written to {}", rows, output);
    Ok(())
}
