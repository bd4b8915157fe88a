use serde::{Deserialize, Serialize};

use super::Timestamp;

/// Habit strength on one day, normalized to `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub timestamp: Timestamp,
    pub value: f64,
}

impl Score {
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Rounded percentage, as shown to users.
    pub fn percent(&self) -> u32 {
        (self.value * 100.0).round().clamp(0.0, 100.0) as u32
    }
}
