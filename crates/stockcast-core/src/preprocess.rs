//! Turns raw provider rows into a canonical [`PriceSeries`].

use std::collections::BTreeMap;

use time::OffsetDateTime;

use crate::data_source::RawHistory;
use crate::{ForecastError, IsoDate, PricePoint, PriceSeries};

/// Builds the `(date, close)` series used by every later stage.
///
/// Timestamps are shifted by the exchange offset before taking the calendar date. Rows
/// whose close is missing, non-finite or non-positive are dropped. When two rows land on
/// the same date the later one in provider order wins. `window` keeps only the trailing
/// observations.
///
/// # Errors
///
/// [`ForecastError::DataUnavailable`] when no usable row remains, and
/// [`ForecastError::Internal`] for timestamps outside the representable range.
pub fn to_price_series(
    raw: &RawHistory,
    window: Option<usize>,
) -> Result<PriceSeries, ForecastError> {
    let offset = i64::from(raw.utc_offset_seconds);
    let mut by_date = BTreeMap::new();
    let mut dropped = 0_usize;

    for bar in &raw.bars {
        let Some(close) = bar.close.filter(|close| close.is_finite() && *close > 0.0) else {
            dropped += 1;
            continue;
        };

        let local = OffsetDateTime::from_unix_timestamp(bar.timestamp + offset).map_err(|e| {
            ForecastError::internal(format!(
                "provider timestamp {} is out of range: {e}",
                bar.timestamp
            ))
        })?;
        by_date.insert(IsoDate::from(local.date()), close);
    }

    if dropped > 0 {
        tracing::debug!(symbol = %raw.symbol, dropped, "dropped rows without a usable close");
    }

    if by_date.is_empty() {
        return Err(ForecastError::data_unavailable(format!(
            "No data found for {}",
            raw.symbol
        )));
    }

    let points = by_date
        .into_iter()
        .map(|(date, close)| PricePoint::new(date, close))
        .collect();
    let series = PriceSeries::new(points)?;

    Ok(match window {
        Some(count) => series.into_trailing(count),
        None => series,
    })
}
