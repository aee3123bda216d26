//! Training percentage and the per-class rounding policy

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SplitError;

/// Percentage of each class assigned to training, always within 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct TrainingPercent(u8);

impl TrainingPercent {
    pub const DEFAULT: TrainingPercent = TrainingPercent(30);
    pub const NONE: TrainingPercent = TrainingPercent(0);
    pub const ALL: TrainingPercent = TrainingPercent(100);

    pub fn new(value: i64) -> Result<Self, SplitError> {
        match u8::try_from(value) {
            Ok(v) if v <= 100 => Ok(Self(v)),
            _ => Err(SplitError::InvalidPercent { value }),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Number of records out of `class_size` that go to training.
    ///
    /// Computes `percent / 100 * class_size` exactly and rounds half to even,
    /// so a class of 1 at 50% gets 0 and a class of 5 at 30% gets 2.
    pub fn training_count(self, class_size: usize) -> usize {
        let scaled = u128::from(self.0) * class_size as u128;
        let quotient = scaled / 100;
        let remainder = scaled % 100;

        let rounded = match remainder.cmp(&50) {
            std::cmp::Ordering::Greater => quotient + 1,
            std::cmp::Ordering::Equal => quotient + (quotient % 2),
            std::cmp::Ordering::Less => quotient,
        };
        // rounded <= class_size because percent <= 100
        rounded as usize
    }
}

impl Default for TrainingPercent {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for TrainingPercent {
    type Error = SplitError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TrainingPercent> for u8 {
    fn from(value: TrainingPercent) -> Self {
        value.0
    }
}

impl FromStr for TrainingPercent {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s.trim().parse().map_err(|_| {
            SplitError::invalid_request(format!("training percent '{}' is not an integer", s))
        })?;
        Self::new(value)
    }
}

impl fmt::Display for TrainingPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
