//! Deprivation-zone listing with map shading.

use clap::ValueEnum;
use fim_model::zone::{ShadeMode, ZoneShade, ZoneStore};
use fim_model::{FilterCriteria, QuintileSet, Scenario};
use fim_utils::money::format_millions;
use log::info;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadeArg {
    /// Shade by pre-aggregated damage
    Damage,
    /// Shade by units at risk
    Units,
}

impl From<ShadeArg> for ShadeMode {
    fn from(arg: ShadeArg) -> Self {
        match arg {
            ShadeArg::Damage => ShadeMode::Damage,
            ShadeArg::Units => ShadeMode::Units,
        }
    }
}

/// One printed line per visible zone: id, name, quintile, value, shade.
pub fn zone_lines(
    store: &ZoneStore,
    scenario: Scenario,
    quintiles: QuintileSet,
    mode: ShadeMode,
) -> Vec<String> {
    let criteria = FilterCriteria {
        quintiles,
        ..FilterCriteria::everything()
    };
    store
        .visible_zones(&criteria)
        .map(|zone| {
            let value = match mode {
                ShadeMode::Damage => format_millions(zone.damage.get(scenario)),
                ShadeMode::Units => format!("{:.0} units", zone.units_at_risk.get(scenario)),
            };
            let shade: ZoneShade = zone.shade(scenario, mode);
            format!(
                "{}\t{}\tQ{}\t{}\t{:?}",
                zone.data_zone,
                zone.name,
                zone.quintile.get(),
                value,
                shade
            )
        })
        .collect()
}

pub fn run_zones(
    path: &str,
    scenario: Scenario,
    quintiles: &[u8],
    shade: ShadeArg,
) -> anyhow::Result<()> {
    let text = fim_utils::input::read_dataset(path)?;
    let store = ZoneStore::from_geojson_str(&text)
        .map_err(|e| anyhow::anyhow!("Failed to load zones from {}: {}", path, e))?;
    let selection = if quintiles.is_empty() {
        QuintileSet::all()
    } else {
        QuintileSet::from_ranks(quintiles.iter().copied())?
    };

    let lines = zone_lines(&store, scenario, selection, shade.into());
    for line in &lines {
        println!("{}", line);
    }
    info!("[FIM] zones: {} of {} zones shown", lines.len(), store.len());
    Ok(())
}
