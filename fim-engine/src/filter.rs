//! Inclusion test combining quintile, usage and polygon predicates.
//!
//! The predicates run in that order and stop at the first failure. The
//! polygon is validated once per filter pass; an invalid polygon excludes
//! every record and is reported once.

use crate::spatial::Ring;
use fim_model::{BuildingRecord, FilterCriteria, GeometryError, QuintileSet, UsageSet};

/// Quintile predicate. Unclassified records pass only while all five quintiles are selected.
pub fn quintile_matches(record: &BuildingRecord, quintiles: QuintileSet) -> bool {
    quintiles.contains(record.quintile) || (!record.quintile.is_known() && quintiles.is_full())
}

pub fn usage_matches(record: &BuildingRecord, usages: UsageSet) -> bool {
    usages.contains(record.use_class)
}

#[derive(Debug, Clone)]
enum PolygonPredicate {
    Unrestricted,
    Inside(Ring),
    Invalid(GeometryError),
}

/// Filter criteria prepared for one pass over the store.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    quintiles: QuintileSet,
    usages: UsageSet,
    polygon: PolygonPredicate,
}

impl CompiledFilter {
    pub fn new(criteria: &FilterCriteria) -> CompiledFilter {
        let polygon = match &criteria.polygon {
            None => PolygonPredicate::Unrestricted,
            Some(vertices) => match Ring::new(vertices) {
                Ok(ring) => PolygonPredicate::Inside(ring),
                Err(e) => {
                    log::warn!("[FIM] filter: polygon rejected, excluding all records: {}", e);
                    PolygonPredicate::Invalid(e)
                }
            },
        };
        CompiledFilter {
            quintiles: criteria.quintiles,
            usages: criteria.usages,
            polygon,
        }
    }

    pub fn includes(&self, record: &BuildingRecord) -> bool {
        if !quintile_matches(record, self.quintiles) {
            return false;
        }
        if !usage_matches(record, self.usages) {
            return false;
        }
        match &self.polygon {
            PolygonPredicate::Unrestricted => true,
            PolygonPredicate::Inside(ring) => ring.contains(record.location),
            PolygonPredicate::Invalid(_) => false,
        }
    }

    /// The polygon failure for this pass, if any.
    pub fn geometry_error(&self) -> Option<&GeometryError> {
        match &self.polygon {
            PolygonPredicate::Invalid(e) => Some(e),
            _ => None,
        }
    }
}

/// Single-record inclusion test. Validates the polygon on every call; use
/// [`CompiledFilter`] for a pass over many records.
pub fn includes(record: &BuildingRecord, criteria: &FilterCriteria) -> bool {
    if !quintile_matches(record, criteria.quintiles) || !usage_matches(record, criteria.usages) {
        return false;
    }
    match &criteria.polygon {
        None => true,
        Some(vertices) => Ring::new(vertices)
            .map(|ring| ring.contains(record.location))
            .unwrap_or(false),
    }
}
