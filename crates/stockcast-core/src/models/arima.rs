use std::fmt::{Display, Formatter};
use std::str::FromStr;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::linalg::least_squares;
use super::{FittedModel, ForecastModel, ModelKind};
use crate::{ForecastError, ValidationError};

const MAX_LAG: usize = 10;
const MAX_DIFFERENCING: usize = 2;

/// ARIMA orders `(p, d, q)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Result<Self, ValidationError> {
        if p > MAX_LAG || q > MAX_LAG || d > MAX_DIFFERENCING {
            return Err(ValidationError::InvalidArimaOrder {
                value: format!("{p},{d},{q}"),
            });
        }
        Ok(Self { p, d, q })
    }

    /// Long autoregression order used to approximate innovations when `q > 0`.
    const fn long_ar_order(self) -> usize {
        self.p + self.q + 1
    }

    /// First differenced index that enters the final regression.
    const fn first_row(self) -> usize {
        if self.q == 0 {
            self.p
        } else {
            let lag = if self.p > self.q { self.p } else { self.q };
            self.long_ar_order() + lag
        }
    }

    /// Shortest training series with more regression rows than coefficients.
    pub const fn min_train_len(self) -> usize {
        self.d + self.first_row() + self.p + self.q + 2
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self { p: 5, d: 1, q: 0 }
    }
}

impl Display for ArimaOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}", self.p, self.d, self.q)
    }
}

/// Parses `p,d,q`, optionally wrapped in parentheses.
impl FromStr for ArimaOrder {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidArimaOrder {
            value: value.to_owned(),
        };
        let inner = value
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')');
        let parts = inner
            .split(',')
            .map(|part| part.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;

        match parts.as_slice() {
            [p, d, q] => Self::new(*p, *d, *q).map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

/// ARIMA family.
///
/// AR terms are estimated by conditional least squares with an intercept on the
/// `d`-times differenced series. MA terms use the Hannan-Rissanen procedure: residuals of
/// a long autoregression stand in for the unobserved innovations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arima {
    order: ArimaOrder,
}

impl Arima {
    pub const fn new(order: ArimaOrder) -> Self {
        Self { order }
    }

    pub const fn order(&self) -> ArimaOrder {
        self.order
    }
}

impl ForecastModel for Arima {
    fn kind(&self) -> ModelKind {
        ModelKind::Arima
    }

    fn min_train_len(&self) -> usize {
        self.order.min_train_len()
    }

    fn fit(&self, train: &[f64]) -> Result<Box<dyn FittedModel>, ForecastError> {
        let order = self.order;
        let required = order.min_train_len();
        if train.len() < required {
            return Err(ForecastError::model_fit(
                ModelKind::Arima.as_str(),
                format!(
                    "ARIMA({order}) needs at least {required} observations, got {}",
                    train.len()
                ),
            ));
        }

        let mut anchors = Vec::with_capacity(order.d);
        let mut differenced = train.to_vec();
        for _ in 0..order.d {
            if let Some(&last) = differenced.last() {
                anchors.push(last);
            }
            differenced = difference(&differenced);
        }

        let innovations = if order.q == 0 {
            Vec::new()
        } else {
            let lags = order.long_ar_order();
            let (intercept, coefficients) = fit_autoregression(&differenced, lags)?;
            regression_residuals(&differenced, &[], intercept, &coefficients, &[], lags)
        };

        let (intercept, coefficients) = fit_arma(&differenced, &innovations, order)?;
        let (ar, ma) = coefficients.split_at(order.p);
        let residuals =
            regression_residuals(&differenced, &innovations, intercept, ar, ma, order.first_row());

        Ok(Box::new(FittedArima {
            intercept,
            ar: ar.to_vec(),
            ma: ma.to_vec(),
            differenced,
            residuals,
            anchors,
        }))
    }
}

#[derive(Debug, Clone)]
struct FittedArima {
    intercept: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
    /// Last value of each differencing level, outermost first.
    anchors: Vec<f64>,
}

impl FittedModel for FittedArima {
    fn forecast(&self, steps: usize) -> Result<Vec<f64>, ForecastError> {
        let start = self.differenced.len();
        let mut values = self.differenced.clone();
        let mut shocks = self.residuals.clone();

        for _ in 0..steps {
            let next = one_step(&values, &shocks, self.intercept, &self.ar, &self.ma);
            values.push(next);
            shocks.push(0.0);
        }

        let path = integrate(&values[start..], &self.anchors);
        if path.iter().any(|value| !value.is_finite()) {
            return Err(ForecastError::model_fit(
                ModelKind::Arima.as_str(),
                "forecast diverged to a non-finite value",
            ));
        }
        Ok(path)
    }

    /// Forecasts from the end of the training range, so the holdout is not skipped.
    fn horizon_path(&self, _test_len: usize, horizon: usize) -> Result<Vec<f64>, ForecastError> {
        self.forecast(horizon)
    }
}

fn difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

/// Undoes differencing, innermost level first.
fn integrate(path: &[f64], anchors: &[f64]) -> Vec<f64> {
    anchors.iter().rev().fold(path.to_vec(), |deltas, &anchor| {
        let mut level = anchor;
        deltas
            .into_iter()
            .map(|delta| {
                level += delta;
                level
            })
            .collect()
    })
}

fn one_step(values: &[f64], shocks: &[f64], intercept: f64, ar: &[f64], ma: &[f64]) -> f64 {
    let autoregressive: f64 = ar
        .iter()
        .enumerate()
        .filter_map(|(lag, phi)| {
            values
                .len()
                .checked_sub(lag + 1)
                .map(|index| phi * values[index])
        })
        .sum();
    let moving_average: f64 = ma
        .iter()
        .enumerate()
        .filter_map(|(lag, theta)| {
            shocks
                .len()
                .checked_sub(lag + 1)
                .map(|index| theta * shocks[index])
        })
        .sum();
    intercept + autoregressive + moving_average
}

/// In-sample errors of the fitted regression.
///
/// Rows before `start` carry the proxy innovations (or zero). Later rows take the proxies
/// as MA regressors rather than re-running the MA recursion.
fn regression_residuals(
    values: &[f64],
    innovations: &[f64],
    intercept: f64,
    ar: &[f64],
    ma: &[f64],
    start: usize,
) -> Vec<f64> {
    (0..values.len())
        .map(|t| {
            if t < start {
                return innovations.get(t).copied().unwrap_or(0.0);
            }
            let autoregressive: f64 = ar
                .iter()
                .enumerate()
                .map(|(lag, phi)| phi * values[t - lag - 1])
                .sum();
            let moving_average: f64 = ma
                .iter()
                .enumerate()
                .map(|(lag, theta)| theta * innovations[t - lag - 1])
                .sum();
            values[t] - intercept - autoregressive - moving_average
        })
        .collect()
}

fn fit_autoregression(values: &[f64], lags: usize) -> Result<(f64, Vec<f64>), ForecastError> {
    let rows = values.len().saturating_sub(lags);
    let design = Array2::from_shape_fn((rows, lags + 1), |(row, col)| {
        let t = row + lags;
        if col == 0 {
            1.0
        } else {
            values[t - col]
        }
    });
    let target = Array1::from_iter(values[lags..].iter().copied());
    solve_coefficients(&design, &target)
}

fn fit_arma(
    values: &[f64],
    innovations: &[f64],
    order: ArimaOrder,
) -> Result<(f64, Vec<f64>), ForecastError> {
    let start = order.first_row();
    let rows = values.len().saturating_sub(start);
    let design = Array2::from_shape_fn((rows, 1 + order.p + order.q), |(row, col)| {
        let t = row + start;
        match col {
            0 => 1.0,
            c if c <= order.p => values[t - c],
            c => innovations[t - (c - order.p)],
        }
    });
    let target = Array1::from_iter(values[start..].iter().copied());
    solve_coefficients(&design, &target)
}

fn solve_coefficients(
    design: &Array2<f64>,
    target: &Array1<f64>,
) -> Result<(f64, Vec<f64>), ForecastError> {
    if design.nrows() <= design.ncols() {
        return Err(ForecastError::model_fit(
            ModelKind::Arima.as_str(),
            format!(
                "{} regression rows cannot identify {} coefficients",
                design.nrows(),
                design.ncols()
            ),
        ));
    }

    let beta = least_squares(design, target).ok_or_else(|| {
        ForecastError::model_fit(
            ModelKind::Arima.as_str(),
            "normal equations are singular; the differenced series has no variation to model",
        )
    })?;
    Ok((beta[0], beta.iter().skip(1).copied().collect()))
}
