use crate::error::ParameterError;
use crate::geometry::Location;
use crate::quintile::QuintileSet;
use crate::scenario::{MitigationLevel, Scenario, ScenarioParameters};
use crate::usage::{UsageSet, UseClass};
use serde::{Deserialize, Serialize};

/// Multi-attribute and spatial selection applied before aggregation.
///
/// Both sets are expected to be non-empty. The toggle methods never empty
/// them; an empty set built by other means simply selects nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub quintiles: QuintileSet,
    #[serde(default)]
    pub usages: UsageSet,
    /// Lasso ring in (lon, lat); closed or open rings are both accepted
    #[serde(default)]
    pub polygon: Option<Vec<Location>>,
}

impl FilterCriteria {
    /// Criteria that let every record through.
    pub fn everything() -> Self {
        Self {
            quintiles: QuintileSet::all(),
            usages: UsageSet::all(),
            polygon: None,
        }
    }

    pub fn with_polygon(mut self, ring: Vec<Location>) -> Self {
        self.polygon = Some(ring);
        self
    }

    /// Add the quintile if absent, otherwise remove it unless it is the last one.
    ///
    /// Returns whether the selection changed.
    pub fn toggle_quintile(&mut self, rank: u8) -> bool {
        if self.quintiles.contains_rank(rank) {
            if self.quintiles.len() <= 1 {
                return false;
            }
            self.quintiles.remove(rank);
            true
        } else {
            self.quintiles.insert(rank).is_ok()
        }
    }

    /// Add the usage if absent, otherwise remove it unless it is the last one.
    pub fn toggle_usage(&mut self, usage: UseClass) -> bool {
        if self.usages.contains(usage) {
            if self.usages.len() <= 1 {
                return false;
            }
            self.usages.remove(usage);
        } else {
            self.usages.insert(usage);
        }
        true
    }

    pub fn clear_polygon(&mut self) {
        self.polygon = None;
    }

    /// Reject criteria that would select nothing by construction.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.quintiles.is_empty() {
            return Err(ParameterError::EmptySelection("quintiles"));
        }
        if self.usages.is_empty() {
            return Err(ParameterError::EmptySelection("usages"));
        }
        Ok(())
    }
}

/// Everything a recomputation depends on besides the record store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecomputeParams {
    #[serde(flatten)]
    pub scenario: ScenarioParameters,
    #[serde(default)]
    pub criteria: FilterCriteria,
}

/// A discrete user action that invalidates the current result.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterChange {
    Scenario(Scenario),
    Mitigation(MitigationLevel),
    ToggleQuintile(u8),
    ToggleUsage(UseClass),
    Polygon(Option<Vec<Location>>),
}

impl RecomputeParams {
    /// Apply a change event; returns whether anything actually changed.
    pub fn apply(&mut self, change: ParameterChange) -> bool {
        match change {
            ParameterChange::Scenario(scenario) => {
                let changed = self.scenario.scenario != scenario;
                self.scenario.scenario = scenario;
                changed
            }
            ParameterChange::Mitigation(level) => {
                let changed = self.scenario.mitigation != level;
                self.scenario.mitigation = level;
                changed
            }
            ParameterChange::ToggleQuintile(rank) => self.criteria.toggle_quintile(rank),
            ParameterChange::ToggleUsage(usage) => self.criteria.toggle_usage(usage),
            ParameterChange::Polygon(ring) => {
                let changed = self.criteria.polygon != ring;
                self.criteria.polygon = ring;
                changed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_dashboard_opening_state() {
        let criteria = FilterCriteria::default();
        assert!(criteria.quintiles.is_full());
        assert_eq!(
            criteria.usages.iter().collect::<Vec<_>>(),
            vec![UseClass::Residential, UseClass::Mixed]
        );
        assert!(criteria.polygon.is_none());
    }

    #[test]
    fn test_toggle_never_empties_quintiles() {
        let mut criteria = FilterCriteria::default();
        for rank in 1..=4 {
            assert!(criteria.toggle_quintile(rank));
        }
        assert_eq!(criteria.quintiles.ranks().collect::<Vec<_>>(), vec![5]);
        assert!(!criteria.toggle_quintile(5));
        assert_eq!(criteria.quintiles.len(), 1);
        assert!(criteria.toggle_quintile(2));
        assert!(!criteria.toggle_quintile(9));
    }

    #[test]
    fn test_toggle_never_empties_usages() {
        let mut criteria = FilterCriteria::default();
        assert!(criteria.toggle_usage(UseClass::Mixed));
        assert!(!criteria.toggle_usage(UseClass::Residential));
        assert!(criteria.usages.contains(UseClass::Residential));
        assert!(criteria.toggle_usage(UseClass::Other));
        assert_eq!(criteria.usages.len(), 2);
    }

    #[test]
    fn test_params_from_json_file_contents() {
        let json = r#"{
            "scenario": "L",
            "mitigation_level": 2,
            "criteria": {
                "quintiles": [1, 2],
                "usages": ["Commercial"],
                "polygon": [{"lon": 0.0, "lat": 0.0}, {"lon": 1.0, "lat": 0.0}, {"lon": 1.0, "lat": 1.0}]
            }
        }"#;
        let params: RecomputeParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.scenario.scenario, Scenario::Low);
        assert_eq!(params.scenario.mitigation.get(), 2);
        assert_eq!(params.criteria.quintiles.len(), 2);
        assert!(params.criteria.usages.contains(UseClass::Commercial));
        assert_eq!(params.criteria.polygon.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn test_apply_change_events() {
        let mut params = RecomputeParams::default();
        assert!(params.apply(ParameterChange::Scenario(Scenario::High)));
        assert!(!params.apply(ParameterChange::Scenario(Scenario::High)));
        assert!(params.apply(ParameterChange::Mitigation(MitigationLevel::new(1).unwrap())));
        assert!(params.apply(ParameterChange::ToggleUsage(UseClass::Other)));
        assert!(params.apply(ParameterChange::Polygon(Some(vec![Location::new(0.0, 0.0)]))));
        assert!(params.apply(ParameterChange::Polygon(None)));
        assert!(!params.apply(ParameterChange::Polygon(None)));
        assert_eq!(params.scenario.scenario, Scenario::High);
        assert_eq!(params.scenario.mitigation.get(), 1);
        assert_eq!(params.criteria.usages.len(), 3);
    }

    #[test]
    fn test_empty_sets_fail_validation() {
        assert_eq!(FilterCriteria::default().validate(), Ok(()));
        let criteria = FilterCriteria {
            quintiles: QuintileSet::empty(),
            ..FilterCriteria::default()
        };
        assert_eq!(
            criteria.validate(),
            Err(ParameterError::EmptySelection("quintiles"))
        );
        let criteria: FilterCriteria = serde_json::from_str(r#"{"usages": []}"#).unwrap();
        assert_eq!(criteria.validate(), Err(ParameterError::EmptySelection("usages")));
    }

    #[test]
    fn test_params_default_when_fields_missing() {
        let params: RecomputeParams = serde_json::from_str(r#"{"scenario": "M"}"#).unwrap();
        assert_eq!(params, RecomputeParams::default());
    }
}
