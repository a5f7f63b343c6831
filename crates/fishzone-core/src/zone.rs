use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Juvenile risk zone. Declaration order is the fixed label order used by
/// the classifier, the confusion matrix and probability vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Zone {
    /// Low juvenile risk.
    Green,
    /// Moderate or transitional risk.
    Yellow,
    /// High risk, closure advised.
    Red,
}

/// Number of zone labels.
pub const N_ZONES: usize = 3;

impl Zone {
    pub const ALL: [Zone; N_ZONES] = [Zone::Green, Zone::Yellow, Zone::Red];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Zone::Green => 0,
            Zone::Yellow => 1,
            Zone::Red => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Zone::Green => "Green",
            Zone::Yellow => "Yellow",
            Zone::Red => "Red",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a zone label is not one of `Green`, `Yellow`, `Red`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownZone(pub String);

impl fmt::Display for UnknownZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown zone label '{}'", self.0)
    }
}

impl std::error::Error for UnknownZone {}

impl FromStr for Zone {
    type Err = UnknownZone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Green" => Ok(Zone::Green),
            "Yellow" => Ok(Zone::Yellow),
            "Red" => Ok(Zone::Red),
            other => Err(UnknownZone(other.to_string())),
        }
    }
}
