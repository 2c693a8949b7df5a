use crate::error::ParameterError;
use serde::{Deserialize, Serialize};

/// Deprivation rank bucket: 1 = most deprived, 5 = least deprived, 0 = unclassified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quintile(u8);

impl Quintile {
    pub const UNKNOWN: Quintile = Quintile(0);

    /// Accepts 0..=5; anything else is `None`.
    pub fn new(value: u8) -> Option<Self> {
        (value <= 5).then_some(Quintile(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_known(self) -> bool {
        self.0 != 0
    }
}

/// Set of selected quintiles (1..=5), stored as a bitmask.
///
/// Unclassified records are never members; the filter lets them through only
/// when the set is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct QuintileSet(u8);

impl QuintileSet {
    const FULL: u8 = 0b11111;

    pub fn empty() -> Self {
        QuintileSet(0)
    }

    pub fn all() -> Self {
        QuintileSet(Self::FULL)
    }

    /// Build a set from ranks, rejecting anything outside 1..=5.
    pub fn from_ranks<I: IntoIterator<Item = u8>>(ranks: I) -> Result<Self, ParameterError> {
        let mut set = QuintileSet::empty();
        for rank in ranks {
            set.insert(rank)?;
        }
        Ok(set)
    }

    pub fn insert(&mut self, rank: u8) -> Result<(), ParameterError> {
        if !(1..=5).contains(&rank) {
            return Err(ParameterError::QuintileOutOfRange(rank));
        }
        self.0 |= 1 << (rank - 1);
        Ok(())
    }

    pub fn remove(&mut self, rank: u8) {
        if (1..=5).contains(&rank) {
            self.0 &= !(1 << (rank - 1));
        }
    }

    pub fn contains(self, quintile: Quintile) -> bool {
        match quintile.get() {
            0 => false,
            q => self.0 & (1 << (q - 1)) != 0,
        }
    }

    pub fn contains_rank(self, rank: u8) -> bool {
        Quintile::new(rank).is_some_and(|q| self.contains(q))
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_full(self) -> bool {
        self.0 == Self::FULL
    }

    pub fn ranks(self) -> impl Iterator<Item = u8> {
        (1..=5u8).filter(move |r| self.0 & (1 << (r - 1)) != 0)
    }
}

impl Default for QuintileSet {
    fn default() -> Self {
        QuintileSet::all()
    }
}

impl TryFrom<Vec<u8>> for QuintileSet {
    type Error = ParameterError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        QuintileSet::from_ranks(value)
    }
}

impl From<QuintileSet> for Vec<u8> {
    fn from(value: QuintileSet) -> Self {
        value.ranks().collect()
    }
}
