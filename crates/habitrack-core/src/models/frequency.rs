use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// "At least `numerator` repetitions within any `denominator`-day window."
///
/// Construction goes through [`Frequency::new`], which rejects non-positive
/// parts and ratios above one, and collapses `n/n` to the daily `1/1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawFrequency", into = "RawFrequency")]
pub struct Frequency {
    numerator: u32,
    denominator: u32,
}

#[derive(Serialize, Deserialize)]
struct RawFrequency {
    numerator: i64,
    denominator: i64,
}

impl Frequency {
    pub const DAILY: Frequency = Frequency {
        numerator: 1,
        denominator: 1,
    };
    pub const WEEKLY: Frequency = Frequency {
        numerator: 1,
        denominator: 7,
    };
    pub const TWO_TIMES_PER_WEEK: Frequency = Frequency {
        numerator: 2,
        denominator: 7,
    };
    pub const THREE_TIMES_PER_WEEK: Frequency = Frequency {
        numerator: 3,
        denominator: 7,
    };

    pub fn new(numerator: i64, denominator: i64) -> Result<Self, ValidationError> {
        let invalid = ValidationError::InvalidFrequency {
            numerator,
            denominator,
        };
        if numerator <= 0 || denominator <= 0 || numerator > denominator {
            return Err(invalid);
        }
        if numerator == denominator {
            return Ok(Self::DAILY);
        }
        let numerator = u32::try_from(numerator).map_err(|_| invalid.clone())?;
        let denominator = u32::try_from(denominator).map_err(|_| invalid)?;
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    pub fn to_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    pub fn is_daily(&self) -> bool {
        *self == Self::DAILY
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self::DAILY
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "daily" => return Ok(Self::DAILY),
            "weekly" => return Ok(Self::WEEKLY),
            _ => {}
        }
        let parse_err = || ValidationError::InvalidValue {
            field: "frequency".into(),
            message: format!("expected 'N/D', 'daily' or 'weekly', got '{s}'"),
        };
        let (num, den) = s.split_once('/').ok_or_else(parse_err)?;
        let num: i64 = num.trim().parse().map_err(|_| parse_err())?;
        let den: i64 = den.trim().parse().map_err(|_| parse_err())?;
        Self::new(num, den)
    }
}

impl TryFrom<RawFrequency> for Frequency {
    type Error = ValidationError;

    fn try_from(raw: RawFrequency) -> Result<Self, Self::Error> {
        Self::new(raw.numerator, raw.denominator)
    }
}

impl From<Frequency> for RawFrequency {
    fn from(freq: Frequency) -> Self {
        Self {
            numerator: freq.numerator as i64,
            denominator: freq.denominator as i64,
        }
    }
}
