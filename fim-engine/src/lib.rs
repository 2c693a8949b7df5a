//! Scenario evaluation, filtering and aggregation over a loaded record store.
//!
//! Every parameter change triggers a full [`recompute`]: the filter decides
//! which buildings are included, each included building is evaluated under
//! the scenario and mitigation level, and the results are folded into
//! [`AggregateStats`] in a single pass.
//!
//! # Examples
//!
//! ```
//! use fim_engine::recompute;
//! use fim_model::{
//!     BuildingRecord, DepthCodes, FilterCriteria, Location, MitigationLevel, RecordStore,
//!     Scenario, ScenarioParameters,
//! };
//!
//! let mut record = BuildingRecord::new("1000001", Location::new(-3.19, 55.95), 200_000.0);
//! record.residential_units = 4;
//! record.depth_codes = DepthCodes::new(0, 2, 0);
//! let store = RecordStore::from_records(vec![record]);
//!
//! let params = ScenarioParameters::new(Scenario::Medium, MitigationLevel::new(1).unwrap());
//! let result = recompute(&store, params, &FilterCriteria::everything());
//!
//! assert_eq!(result.stats.total_damage, 200_000.0);
//! assert_eq!(result.stats.savings, 120_000.0);
//! assert_eq!(result.stats.at_risk_building_count, 1);
//! ```

pub mod aggregator;
pub mod evaluator;
pub mod filter;
pub mod recompute;
pub mod session;
pub mod spatial;

pub use aggregator::{aggregate, AggregateStats, Aggregator, ChartDatum, TypeGroup};
pub use evaluator::{evaluate, EvaluatedRecord, RiskBand};
pub use filter::{includes, CompiledFilter};
pub use recompute::{
    map_layer, recompute, scenario_summary, EvaluatedEntry, MapFeature, Recomputation,
    ScenarioSummary,
};
#[cfg(feature = "parallel")]
pub use recompute::recompute_parallel;
pub use session::{Generation, RecomputeSession};
pub use spatial::{point_in_polygon, Ring};
