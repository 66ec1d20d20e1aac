//! Maps a calendar target date onto a count of future trading days.

use serde::Serialize;

use crate::{ForecastError, IsoDate};

/// Resolved forecast horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Horizon {
    /// Number of trading days after the last observation, at least one.
    pub steps: usize,
    /// Last trading day of the sequence: the requested target, or the closest earlier
    /// weekday when the target falls on a weekend.
    pub target: IsoDate,
    /// Every trading day in `(last, target]`, in order.
    pub trading_days: Vec<IsoDate>,
}

/// Resolves `target` against the last available observation `last`.
///
/// Weekends are skipped; exchange holidays are not modeled.
///
/// # Errors
///
/// [`ForecastError::InvalidTargetDate`] when `target <= last`, and
/// [`ForecastError::NoTradingDays`] when only weekend days lie in between.
pub fn resolve(last: IsoDate, target: IsoDate) -> Result<Horizon, ForecastError> {
    if target <= last {
        return Err(ForecastError::InvalidTargetDate { target, last });
    }

    let mut trading_days = Vec::new();
    let mut cursor = last.next_day();
    while let Some(day) = cursor.filter(|day| *day <= target) {
        if day.is_trading_day() {
            trading_days.push(day);
        }
        cursor = day.next_day();
    }

    match trading_days.last() {
        Some(&reported) => Ok(Horizon {
            steps: trading_days.len(),
            target: reported,
            trading_days,
        }),
        None => Err(ForecastError::NoTradingDays { target, last }),
    }
}
