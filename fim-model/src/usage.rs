use crate::error::ParameterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Building use classification derived from residential/commercial address counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UseClass {
    Residential,
    Commercial,
    Mixed,
    Other,
}

impl UseClass {
    pub const ALL: [UseClass; 4] = [
        UseClass::Residential,
        UseClass::Commercial,
        UseClass::Mixed,
        UseClass::Other,
    ];

    /// Dataset mapping. Matches the exact class names; anything else becomes `Other`.
    pub fn from_dataset(value: Option<&str>) -> UseClass {
        match value {
            Some("Residential") => UseClass::Residential,
            Some("Commercial") => UseClass::Commercial,
            Some("Mixed") => UseClass::Mixed,
            _ => UseClass::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UseClass::Residential => "Residential",
            UseClass::Commercial => "Commercial",
            UseClass::Mixed => "Mixed",
            UseClass::Other => "Other",
        }
    }

    /// Commercial and mixed-use buildings feed the commercial impact counters.
    pub fn has_commercial_use(self) -> bool {
        matches!(self, UseClass::Commercial | UseClass::Mixed)
    }

    fn bit(self) -> u8 {
        match self {
            UseClass::Residential => 0b0001,
            UseClass::Commercial => 0b0010,
            UseClass::Mixed => 0b0100,
            UseClass::Other => 0b1000,
        }
    }
}

impl fmt::Display for UseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive, for command-line flags.
impl FromStr for UseClass {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "residential" => Ok(UseClass::Residential),
            "commercial" => Ok(UseClass::Commercial),
            "mixed" => Ok(UseClass::Mixed),
            "other" => Ok(UseClass::Other),
            _ => Err(ParameterError::UnknownUsage(s.to_string())),
        }
    }
}

/// Set of selected use classes, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<UseClass>", into = "Vec<UseClass>")]
pub struct UsageSet(u8);

impl UsageSet {
    pub fn empty() -> Self {
        UsageSet(0)
    }

    pub fn all() -> Self {
        UseClass::ALL.into_iter().collect()
    }

    pub fn contains(self, usage: UseClass) -> bool {
        self.0 & usage.bit() != 0
    }

    pub fn insert(&mut self, usage: UseClass) {
        self.0 |= usage.bit();
    }

    pub fn remove(&mut self, usage: UseClass) {
        self.0 &= !usage.bit();
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_full(self) -> bool {
        self == UsageSet::all()
    }

    pub fn iter(self) -> impl Iterator<Item = UseClass> {
        UseClass::ALL.into_iter().filter(move |u| self.contains(*u))
    }
}

/// Residential and mixed-use buildings, the selection the dashboard opens with.
impl Default for UsageSet {
    fn default() -> Self {
        [UseClass::Residential, UseClass::Mixed].into_iter().collect()
    }
}

impl FromIterator<UseClass> for UsageSet {
    fn from_iter<T: IntoIterator<Item = UseClass>>(iter: T) -> Self {
        let mut set = UsageSet::empty();
        for usage in iter {
            set.insert(usage);
        }
        set
    }
}

impl From<Vec<UseClass>> for UsageSet {
    fn from(value: Vec<UseClass>) -> Self {
        value.into_iter().collect()
    }
}

impl From<UsageSet> for Vec<UseClass> {
    fn from(value: UsageSet) -> Self {
        value.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_dataset_values_become_other() {
        assert_eq!(UseClass::from_dataset(Some("Mixed")), UseClass::Mixed);
        assert_eq!(UseClass::from_dataset(Some("Residential")), UseClass::Residential);
        assert_eq!(UseClass::from_dataset(Some("Industrial")), UseClass::Other);
        assert_eq!(UseClass::from_dataset(None), UseClass::Other);
    }

    #[test]
    fn test_dataset_values_are_case_sensitive() {
        assert_eq!(UseClass::from_dataset(Some("residential")), UseClass::Other);
        assert_eq!(UseClass::from_dataset(Some("MIXED")), UseClass::Other);
        assert_eq!(UseClass::from_dataset(Some(" Commercial")), UseClass::Other);
    }

    #[test]
    fn test_flag_values_ignore_case() {
        assert_eq!("residential".parse::<UseClass>().unwrap(), UseClass::Residential);
        assert_eq!(" MIXED ".parse::<UseClass>().unwrap(), UseClass::Mixed);
        assert!("Industrial".parse::<UseClass>().is_err());
    }

    #[test]
    fn test_usage_set_membership() {
        let mut set = UsageSet::default();
        assert!(set.contains(UseClass::Residential));
        assert!(set.contains(UseClass::Mixed));
        assert!(!set.contains(UseClass::Commercial));
        set.insert(UseClass::Commercial);
        set.insert(UseClass::Other);
        assert!(set.is_full());
        set.remove(UseClass::Other);
        assert_eq!(set.len(), 3);
        assert!(UsageSet::empty().is_empty());
    }

    #[test]
    fn test_usage_set_serializes_as_list() {
        let json = serde_json::to_string(&UsageSet::default()).unwrap();
        assert_eq!(json, r#"["Residential","Mixed"]"#);
        let parsed: UsageSet = serde_json::from_str(r#"["Other","Commercial"]"#).unwrap();
        assert_eq!(parsed.iter().collect::<Vec<_>>(), vec![UseClass::Commercial, UseClass::Other]);
    }
}
