//! Technical indicators over a preprocessed close series.
//!
//! | Column | Definition |
//! |--------|------------|
//! | `sma_20` | 20-period simple moving average |
//! | `ema_20` | 20-span exponential average seeded with the first close |
//! | `rsi` | 14-period RSI from simple averages of gains and losses |
//! | `macd` | EMA(12) minus EMA(26) |
//! | `signal` | EMA(9) of `macd` |
//! | `bb_upper` / `bb_lower` | `sma_20` plus or minus two sample standard deviations |
//!
//! Rows where any column is undefined are left out, so the first row is the 20th close.

use serde::Serialize;

use crate::{IsoDate, PriceSeries};

const SMA_PERIOD: usize = 20;
const EMA_SPAN: usize = 20;
const RSI_PERIOD: usize = 14;
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
const BAND_WIDTH: f64 = 2.0;

/// One fully defined indicator row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub date: IsoDate,
    pub close: f64,
    pub sma_20: f64,
    pub ema_20: f64,
    pub rsi: f64,
    pub macd: f64,
    pub signal: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
}

/// Computes every indicator for `series`.
pub fn compute(series: &PriceSeries) -> Vec<IndicatorRow> {
    let closes = series.closes();
    let sma_20 = sma(&closes, SMA_PERIOD);
    let ema_20 = ema(&closes, EMA_SPAN);
    let rsi_14 = rsi(&closes, RSI_PERIOD);
    let fast = ema(&closes, MACD_FAST);
    let slow = ema(&closes, MACD_SLOW);
    let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema(&macd, MACD_SIGNAL);
    let deviation = rolling_std(&closes, SMA_PERIOD);

    series
        .points()
        .iter()
        .enumerate()
        .filter_map(|(i, point)| {
            let (sma, rsi, std) = (sma_20[i]?, rsi_14[i]?, deviation[i]?);
            Some(IndicatorRow {
                date: point.date,
                close: point.close,
                sma_20: sma,
                ema_20: ema_20[i],
                rsi,
                macd: macd[i],
                signal: signal[i],
                bb_upper: sma + BAND_WIDTH * std,
                bb_lower: sma - BAND_WIDTH * std,
            })
        })
        .collect()
}

/// Trailing simple average; `None` until `period` values are available.
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, value) in values.iter().enumerate() {
        sum += value;
        if i >= period {
            sum -= values[i - period];
        }
        out.push((period > 0 && i + 1 >= period).then(|| sum / period as f64));
    }
    out
}

/// Recursive exponential average with `alpha = 2 / (span + 1)`, seeded with the first value.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut current = None;
    for &value in values {
        let next = match current {
            None => value,
            Some(previous) => alpha * value + (1.0 - alpha) * previous,
        };
        out.push(next);
        current = Some(next);
    }
    out
}

/// Sample (n - 1) standard deviation over a trailing window.
fn rolling_std(values: &[f64], period: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if period < 2 || i + 1 < period {
                return None;
            }
            let window = &values[i + 1 - period..=i];
            let mean = window.iter().sum::<f64>() / period as f64;
            let variance =
                window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (period - 1) as f64;
            Some(variance.sqrt())
        })
        .collect()
}

/// RSI from simple trailing averages of gains and losses.
///
/// The first close contributes a zero change. A window without losses reads 100; a
/// window without any change is undefined.
pub fn rsi(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let changes: Vec<f64> = std::iter::once(0.0)
        .chain(values.windows(2).map(|pair| pair[1] - pair[0]))
        .take(values.len())
        .collect();
    let gains: Vec<f64> = changes.iter().map(|c| c.max(0.0)).collect();
    let losses: Vec<f64> = changes.iter().map(|c| (-c).max(0.0)).collect();

    sma(&gains, period)
        .into_iter()
        .zip(sma(&losses, period))
        .map(|(gain, loss)| match (gain?, loss?) {
            (gain, loss) if loss > 0.0 => Some(100.0 - 100.0 / (1.0 + gain / loss)),
            (gain, _) if gain > 0.0 => Some(100.0),
            _ => None,
        })
        .collect()
}
