use crate::error::ParameterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A flood-probability model, named after the likelihood of the event.
///
/// High probability floods are frequent and shallow; Low probability floods
/// are rare and reach further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scenario {
    #[serde(rename = "H", alias = "h", alias = "High", alias = "high")]
    High,
    #[serde(rename = "M", alias = "m", alias = "Medium", alias = "medium")]
    Medium,
    #[serde(rename = "L", alias = "l", alias = "Low", alias = "low")]
    Low,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::High, Scenario::Medium, Scenario::Low];

    /// Single letter code used in dataset property names (`gridcode_h`, ...).
    pub fn code(self) -> &'static str {
        match self {
            Scenario::High => "H",
            Scenario::Medium => "M",
            Scenario::Low => "L",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Scenario::High => "High",
            Scenario::Medium => "Medium",
            Scenario::Low => "Low",
        }
    }

    /// Return period of the modelled event in years.
    pub fn return_period_years(self) -> u32 {
        match self {
            Scenario::High => 10,
            Scenario::Medium => 200,
            Scenario::Low => 1000,
        }
    }

    /// Short display name, e.g. "200-yr".
    pub fn return_period_name(self) -> String {
        format!("{}-yr", self.return_period_years())
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario::Medium
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Scenario {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "h" | "high" => Ok(Scenario::High),
            "m" | "medium" => Ok(Scenario::Medium),
            "l" | "low" => Ok(Scenario::Low),
            _ => Err(ParameterError::UnknownScenario(s.to_string())),
        }
    }
}

/// Number of severity bands removed by simulated flood defences.
///
/// One level corresponds to roughly 50cm of lowered water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MitigationLevel(u8);

impl MitigationLevel {
    pub const MAX: u8 = 2;
    pub const NONE: MitigationLevel = MitigationLevel(0);

    pub fn new(level: u8) -> Result<Self, ParameterError> {
        if level > Self::MAX {
            return Err(ParameterError::MitigationOutOfRange(level));
        }
        Ok(MitigationLevel(level))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for MitigationLevel {
    type Error = ParameterError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        MitigationLevel::new(value)
    }
}

impl From<MitigationLevel> for u8 {
    fn from(value: MitigationLevel) -> Self {
        value.0
    }
}

/// Scenario choice plus mitigation, the evaluator's full input besides the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScenarioParameters {
    pub scenario: Scenario,
    #[serde(default, rename = "mitigation_level")]
    pub mitigation: MitigationLevel,
}

impl ScenarioParameters {
    pub fn new(scenario: Scenario, mitigation: MitigationLevel) -> Self {
        Self {
            scenario,
            mitigation,
        }
    }
}
