//! Chronological train/test partition.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ForecastError, PricePoint, ValidationError};

/// How many trailing observations are held out for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldoutPolicy {
    /// Train on the first `floor(ratio * n)` observations.
    Proportional(f64),
    /// Hold out exactly the last `count` observations.
    Fixed(usize),
}

impl Default for HoldoutPolicy {
    fn default() -> Self {
        Self::Proportional(0.8)
    }
}

impl HoldoutPolicy {
    pub fn validate(self) -> Result<Self, ValidationError> {
        let valid = match self {
            Self::Proportional(ratio) => ratio.is_finite() && ratio > 0.0 && ratio < 1.0,
            Self::Fixed(count) => count > 0,
        };
        if valid {
            Ok(self)
        } else {
            Err(ValidationError::InvalidHoldout {
                value: self.to_string(),
            })
        }
    }

    /// Holdout length for a series of `len` observations.
    pub fn test_len(self, len: usize) -> usize {
        match self {
            Self::Proportional(ratio) => len - train_len(ratio, len),
            Self::Fixed(count) => count.min(len),
        }
    }
}

fn train_len(ratio: f64, len: usize) -> usize {
    ((ratio * len as f64).floor() as usize).min(len)
}

impl Display for HoldoutPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Proportional(ratio) => write!(f, "{ratio}"),
            Self::Fixed(count) => write!(f, "last:{count}"),
        }
    }
}

/// Accepts a train ratio such as `0.8` or a fixed holdout such as `last:30`.
impl FromStr for HoldoutPolicy {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidHoldout {
            value: value.to_owned(),
        };
        let trimmed = value.trim();

        let policy = match trimmed.strip_prefix("last:") {
            Some(count) => Self::Fixed(count.trim().parse().map_err(|_| invalid())?),
            None => Self::Proportional(trimmed.parse().map_err(|_| invalid())?),
        };
        policy.validate().map_err(|_| invalid())
    }
}

/// Borrowed `(train, test)` halves of one series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split<'a> {
    pub train: &'a [PricePoint],
    pub test: &'a [PricePoint],
}

impl Split<'_> {
    pub fn train_closes(&self) -> Vec<f64> {
        self.train.iter().map(|point| point.close).collect()
    }

    pub fn test_closes(&self) -> Vec<f64> {
        self.test.iter().map(|point| point.close).collect()
    }
}

/// Partitions `points` by position.
///
/// `min_observations` is the configured floor for the whole series and
/// `model_min_train` the largest training length any enabled model needs.
///
/// # Errors
///
/// [`ForecastError::InsufficientData`] when the series is below
/// `max(min_observations, holdout + model_min_train)` or either side would be empty.
pub fn split(
    points: &[PricePoint],
    policy: HoldoutPolicy,
    min_observations: usize,
    model_min_train: usize,
) -> Result<Split<'_>, ForecastError> {
    let n = points.len();
    let test_len = policy.test_len(n);
    let train_floor = model_min_train.max(1);
    let holdout = match policy {
        HoldoutPolicy::Fixed(count) => count,
        HoldoutPolicy::Proportional(_) => test_len.max(1),
    };
    let required = min_observations.max(holdout + train_floor);

    if n < required || test_len == 0 || n - test_len < train_floor {
        return Err(ForecastError::InsufficientData {
            required,
            actual: n,
        });
    }

    let (train, test) = points.split_at(n - test_len);
    Ok(Split { train, test })
}
