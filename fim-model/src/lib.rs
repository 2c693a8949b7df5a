//! Core types for the flood impact engine.
//!
//! Building records are loaded once from the preprocessed GeoJSON dataset
//! into a [`RecordStore`](loader::RecordStore) and never mutated. Scenario and
//! filter parameters are plain values passed into each recomputation.

pub mod criteria;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod quintile;
pub mod record;
pub mod scenario;
pub mod usage;
pub mod zone;

pub use criteria::{FilterCriteria, ParameterChange, RecomputeParams};
pub use error::{DataFormatError, GeometryError, ParameterError};
pub use geometry::Location;
pub use loader::{load_records, LoadReport, RecordStore};
pub use quintile::{Quintile, QuintileSet};
pub use record::{BuildingRecord, DepthCodes};
pub use scenario::{MitigationLevel, Scenario, ScenarioParameters};
pub use usage::{UsageSet, UseClass};
