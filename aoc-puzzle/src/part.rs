//! Puzzle parts

use crate::error::CacheError;
use std::fmt;
use std::str::FromStr;

/// Part one or part two of a puzzle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Part {
    One,
    Two,
}

impl Part {
    pub const ALL: [Part; 2] = [Part::One, Part::Two];

    /// The server's `level` value, 1 or 2
    pub fn level(self) -> u8 {
        match self {
            Part::One => 1,
            Part::Two => 2,
        }
    }

    /// Human readable name, e.g. "Part One"
    pub fn name(self) -> &'static str {
        match self {
            Part::One => "Part One",
            Part::Two => "Part Two",
        }
    }
}

impl TryFrom<u8> for Part {
    type Error = CacheError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Part::One),
            2 => Ok(Part::Two),
            other => Err(CacheError::InvalidKey(format!(
                "part must be 1 or 2, got {}",
                other
            ))),
        }
    }
}

impl FromStr for Part {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map_err(|_| CacheError::InvalidKey(format!("part must be 1 or 2, got {:?}", s)))
            .and_then(Part::try_from)
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// One value per part
///
/// Built from page elements with a positional contract: index 0 belongs to
/// part one, index 1 to part two, and a missing index means the part is not
/// unlocked yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByPart<T> {
    pub one: T,
    pub two: T,
}

impl<T> ByPart<T> {
    pub fn get(&self, part: Part) -> &T {
        match part {
            Part::One => &self.one,
            Part::Two => &self.two,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Part, &T)> {
        [(Part::One, &self.one), (Part::Two, &self.two)].into_iter()
    }
}

impl<T> ByPart<Option<T>> {
    /// Assign items to parts by position, ignoring anything past the second
    pub fn from_ordered(items: impl IntoIterator<Item = T>) -> Self {
        let mut items = items.into_iter();
        let one = items.next();
        let two = items.next();
        Self { one, two }
    }
}
