use serde::{Deserialize, Serialize};

use crate::{IsoDate, ValidationError};

/// One daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: IsoDate,
    pub close: f64,
}

impl PricePoint {
    pub const fn new(date: IsoDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Daily closes ordered by strictly increasing date, every close finite and positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, ValidationError> {
        for point in &points {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(ValidationError::InvalidClose {
                    date: point.date,
                    value: point.close,
                });
            }
        }

        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ValidationError::UnorderedDates {
                    previous: pair[0].date,
                    next: pair[1].date,
                });
            }
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.close).collect()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn last_date(&self) -> Option<IsoDate> {
        self.points.last().map(|point| point.date)
    }

    /// The last `count` observations, or the whole series when it is shorter.
    pub fn tail(&self, count: usize) -> &[PricePoint] {
        let start = self.points.len().saturating_sub(count);
        &self.points[start..]
    }

    /// Keep only the trailing `count` observations.
    pub fn into_trailing(mut self, count: usize) -> Self {
        let start = self.points.len().saturating_sub(count);
        self.points.drain(..start);
        self
    }
}
