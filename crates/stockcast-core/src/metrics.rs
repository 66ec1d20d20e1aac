//! Holdout accuracy metrics and residuals.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ensemble::ModelRun;
use crate::models::ModelKind;
use crate::{ForecastError, IsoDate, PricePoint};

/// Accuracy of one model on the holdout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelMetrics {
    pub rmse: f64,
    /// `None` (serialized as `null`) when any actual value is exactly zero.
    pub mape: Option<f64>,
}

/// Holdout errors of every model on one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidualRecord {
    pub date: IsoDate,
    /// `actual - predicted` per model.
    #[serde(flatten)]
    pub errors: BTreeMap<ModelKind, f64>,
}

fn check_lengths(actual: &[f64], predicted: &[f64]) -> Result<(), ForecastError> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return Err(ForecastError::internal(format!(
            "cannot score {} predictions against {} actual values",
            predicted.len(),
            actual.len()
        )));
    }
    Ok(())
}

/// Root mean squared error.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64, ForecastError> {
    check_lengths(actual, predicted)?;
    let mean_sq = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64;
    Ok(mean_sq.sqrt())
}

/// Mean absolute percentage error, in percent.
pub fn mape(actual: &[f64], predicted: &[f64]) -> Result<Option<f64>, ForecastError> {
    check_lengths(actual, predicted)?;
    if actual.iter().any(|value| *value == 0.0) {
        return Ok(None);
    }
    let mean = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| ((a - p) / a).abs())
        .sum::<f64>()
        / actual.len() as f64;
    Ok(Some(mean * 100.0))
}

/// Scores every run against the held-out closes.
pub fn evaluate(
    actual: &[f64],
    runs: &[ModelRun],
) -> Result<BTreeMap<ModelKind, ModelMetrics>, ForecastError> {
    runs.iter()
        .map(|run| {
            let metrics = ModelMetrics {
                rmse: rmse(actual, &run.holdout)?,
                mape: mape(actual, &run.holdout)?,
            };
            Ok((run.model, metrics))
        })
        .collect()
}

/// One record per held-out date, aligned by position.
pub fn residuals(test: &[PricePoint], runs: &[ModelRun]) -> Result<Vec<ResidualRecord>, ForecastError> {
    if let Some(run) = runs.iter().find(|run| run.holdout.len() != test.len()) {
        return Err(ForecastError::internal(format!(
            "model '{}' has {} holdout predictions for {} test dates",
            run.model,
            run.holdout.len(),
            test.len()
        )));
    }

    Ok(test
        .iter()
        .enumerate()
        .map(|(index, point)| ResidualRecord {
            date: point.date,
            errors: runs
                .iter()
                .map(|run| (run.model, point.close - run.holdout[index]))
                .collect(),
        })
        .collect())
}
