use serde::{Deserialize, Serialize};

use super::Timestamp;

/// Derived state of one day.
///
/// The integer encoding (0, 1, 2) is what CSV export writes and must stay
/// stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckmarkValue {
    /// Not satisfied.
    #[default]
    Unknown = 0,
    /// Satisfied implicitly by the frequency quota.
    YesAuto = 1,
    /// A manual repetition exists on this day.
    YesManual = 2,
}

impl CheckmarkValue {
    pub fn as_i64(&self) -> i64 {
        *self as i64
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(CheckmarkValue::Unknown),
            1 => Some(CheckmarkValue::YesAuto),
            2 => Some(CheckmarkValue::YesManual),
            _ => None,
        }
    }

    /// True for both implicit and explicit completion.
    pub fn is_done(&self) -> bool {
        *self > CheckmarkValue::Unknown
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkmark {
    pub timestamp: Timestamp,
    pub value: CheckmarkValue,
}

impl Checkmark {
    pub fn new(timestamp: Timestamp, value: CheckmarkValue) -> Self {
        Self { timestamp, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_encoding_round_trips() {
        for v in [CheckmarkValue::Unknown, CheckmarkValue::YesAuto, CheckmarkValue::YesManual] {
            assert_eq!(CheckmarkValue::from_i64(v.as_i64()), Some(v));
        }
        assert_eq!(CheckmarkValue::YesManual.as_i64(), 2);
        assert_eq!(CheckmarkValue::from_i64(3), None);
    }

    #[test]
    fn done_means_above_unknown() {
        assert!(!CheckmarkValue::Unknown.is_done());
        assert!(CheckmarkValue::YesAuto.is_done());
        assert!(CheckmarkValue::YesManual.is_done());
    }
}
