/// Error types for the flood impact model
use serde::Serialize;
use thiserror::Error;

/// Raised while turning raw dataset features into building records.
///
/// A per-record error drops that record from the store; only a malformed
/// top-level document fails a whole load.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataFormatError {
    /// The document is not valid JSON or not a FeatureCollection
    #[error("Invalid dataset document: {0}")]
    InvalidDocument(String),

    /// A field without a safe default is absent or null
    #[error("Missing required field `{0}`")]
    MissingField(&'static str),

    /// A field is present but has the wrong type or an unusable value
    #[error("Invalid value for field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The feature geometry is not a finite (lon, lat) point
    #[error("Invalid point geometry: {0}")]
    InvalidGeometry(String),

    /// Another record with the same id was already loaded
    #[error("Duplicate record id: {0}")]
    DuplicateId(String),
}

/// Raised for a filter polygon that cannot give a reproducible containment answer.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum GeometryError {
    /// A ring needs at least three distinct vertices
    #[error("Polygon ring has {found} distinct vertices (needed: 3)")]
    TooFewVertices { found: usize },

    /// NaN or infinite coordinate in the ring
    #[error("Polygon vertex {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },

    /// All vertices are collinear
    #[error("Polygon ring encloses zero area")]
    ZeroArea,

    /// GeoJSON input that does not describe a polygon
    #[error("Unsupported polygon geometry: {0}")]
    Unsupported(String),
}

/// Raised when scenario or filter parameters are out of their domain.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Unknown scenario `{0}` (expected H, M or L)")]
    UnknownScenario(String),

    #[error("Mitigation level {0} is out of range (0..=2)")]
    MitigationOutOfRange(u8),

    #[error("Quintile {0} is out of range (1..=5)")]
    QuintileOutOfRange(u8),

    #[error("Unknown usage class `{0}`")]
    UnknownUsage(String),

    #[error("Selection `{0}` must keep at least one element")]
    EmptySelection(&'static str),
}
