//! Command implementations for the flood impact CLI.
//!
//! Every command loads the building dataset once, runs one or more
//! recomputations and writes the result to stdout or a file.

use clap::Subcommand;

pub mod export;
pub mod layer;
pub mod params;
pub mod report;
pub mod zones;

use params::ParamArgs;

#[derive(Subcommand)]
pub enum Command {
    /// Recompute damage statistics for one scenario and filter selection
    Recompute {
        /// Building dataset (GeoJSON, optionally .gz)
        #[arg(short = 'd', long)]
        dataset: String,

        #[command(flatten)]
        params: ParamArgs,

        /// Print the statistics as JSON instead of a text report
        #[arg(long)]
        json: bool,
    },

    /// Write the filtered, evaluated buildings as CSV
    Export {
        /// Building dataset (GeoJSON, optionally .gz)
        #[arg(short = 'd', long)]
        dataset: String,

        #[command(flatten)]
        params: ParamArgs,

        /// Output CSV path
        #[arg(short = 'o', long)]
        output: String,
    },

    /// Unfiltered, unmitigated totals for every scenario
    Summary {
        /// Building dataset (GeoJSON, optionally .gz)
        #[arg(short = 'd', long)]
        dataset: String,

        /// Write the summary JSON here instead of stdout
        #[arg(short = 'o', long)]
        output: Option<String>,
    },

    /// List deprivation zones visible under a quintile selection
    Zones {
        /// Zone dataset (GeoJSON, optionally .gz)
        #[arg(short = 'z', long)]
        zones: String,

        /// Scenario: H, M or L
        #[arg(short, long, default_value = "M")]
        scenario: fim_model::Scenario,

        /// Comma-separated quintiles to show, e.g. 1,2
        #[arg(short, long, value_delimiter = ',')]
        quintiles: Vec<u8>,

        /// Value that drives the shading
        #[arg(long, value_enum, default_value_t = zones::ShadeArg::Damage)]
        shade: zones::ShadeArg,
    },

    /// Write buildings inside the flood extent as a GeoJSON map layer
    Layer {
        /// Building dataset (GeoJSON, optionally .gz)
        #[arg(short = 'd', long)]
        dataset: String,

        #[command(flatten)]
        params: ParamArgs,

        /// Output GeoJSON path
        #[arg(short = 'o', long)]
        output: String,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Recompute {
            dataset,
            params,
            json,
        } => report::run_recompute(&dataset, &params, json),
        Command::Export {
            dataset,
            params,
            output,
        } => export::run_export(&dataset, &params, &output),
        Command::Summary { dataset, output } => report::run_summary(&dataset, output.as_deref()),
        Command::Zones {
            zones,
            scenario,
            quintiles,
            shade,
        } => zones::run_zones(&zones, scenario, &quintiles, shade),
        Command::Layer {
            dataset,
            params,
            output,
        } => layer::run_layer(&dataset, &params, &output),
    }
}

/// Load the building dataset into a record store.
pub fn load_store(path: &str) -> anyhow::Result<fim_model::RecordStore> {
    let text = fim_utils::input::read_dataset(path)?;
    let store = fim_model::RecordStore::from_geojson_str(&text)
        .map_err(|e| anyhow::anyhow!("Failed to load buildings from {}: {}", path, e))?;
    if store.is_empty() {
        log::warn!("[FIM] cmd: {} contained no usable building records", path);
    }
    Ok(store)
}
