use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity of a reported job event.
///
/// The integer code is persisted as-is by the database channel, so the
/// discriminants are part of the external contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Success = 0,
    Warning = 1,
    Failure = 2,
}

impl AlertLevel {
    pub const ALL: [Self; 3] = [Self::Success, Self::Warning, Self::Failure];

    #[must_use]
    pub const fn code(self) -> i64 {
        self as i64
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Failure => "FAILURE",
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown alert level `{0}` (expected success, warning or failure)")]
pub struct ParseLevelError(pub String);

impl FromStr for AlertLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" => Ok(Self::Success),
            "WARNING" => Ok(Self::Warning),
            "FAILURE" => Ok(Self::Failure),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// A set of alert levels, used both for the globally supported levels and
/// for each channel's monitored levels.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<AlertLevel>", into = "Vec<AlertLevel>")]
pub struct LevelSet(u8);

impl LevelSet {
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn all() -> Self {
        Self(AlertLevel::Success.bit() | AlertLevel::Warning.bit() | AlertLevel::Failure.bit())
    }

    #[must_use]
    pub const fn contains(self, level: AlertLevel) -> bool {
        self.0 & level.bit() != 0
    }

    #[must_use]
    pub const fn with(self, level: AlertLevel) -> Self {
        Self(self.0 | level.bit())
    }

    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    #[must_use]
    pub const fn is_subset(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Levels in ascending severity order.
    pub fn iter(self) -> impl Iterator<Item = AlertLevel> {
        AlertLevel::ALL.into_iter().filter(move |l| self.contains(*l))
    }
}

impl FromIterator<AlertLevel> for LevelSet {
    fn from_iter<I: IntoIterator<Item = AlertLevel>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl<const N: usize> From<[AlertLevel; N]> for LevelSet {
    fn from(levels: [AlertLevel; N]) -> Self {
        levels.into_iter().collect()
    }
}

impl From<Vec<AlertLevel>> for LevelSet {
    fn from(levels: Vec<AlertLevel>) -> Self {
        levels.into_iter().collect()
    }
}

impl From<LevelSet> for Vec<AlertLevel> {
    fn from(set: LevelSet) -> Self {
        set.iter().collect()
    }
}

impl std::fmt::Debug for LevelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl std::fmt::Display for LevelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.iter().map(AlertLevel::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
