//! Fits every enabled model on the training closes and forecasts holdout and horizon.

use crate::models::{ForecastModel, ModelKind};
use crate::ForecastError;

/// Output of one model for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRun {
    pub model: ModelKind,
    /// Predictions aligned with the held-out observations.
    pub holdout: Vec<f64>,
    /// Predictions for each trading day of the horizon.
    pub path: Vec<f64>,
}

impl ModelRun {
    /// Prediction for the resolved target date, the last value of the path.
    pub fn prediction(&self) -> Option<f64> {
        self.path.last().copied()
    }
}

/// Fits each model independently on `train`.
///
/// The holdout comes from `forecast(test_len)`. The path comes from
/// [`FittedModel::horizon_path`](crate::models::FittedModel::horizon_path): ARIMA
/// forecasts `horizon` steps from the end of training, the index regressors predict at the
/// positions that follow the whole series.
///
/// # Errors
///
/// The first model failure aborts the whole run; no partial results are returned.
pub fn run(
    models: &[Box<dyn ForecastModel>],
    train: &[f64],
    test_len: usize,
    horizon: usize,
) -> Result<Vec<ModelRun>, ForecastError> {
    if horizon == 0 {
        return Err(ForecastError::internal("forecast horizon must be at least one step"));
    }

    models
        .iter()
        .map(|model| {
            let kind = model.kind();
            let fitted = model.fit(train)?;
            let holdout = fitted.forecast(test_len)?;
            let path = fitted.horizon_path(test_len, horizon)?;
            if holdout.len() != test_len || path.len() != horizon {
                return Err(ForecastError::internal(format!(
                    "model '{kind}' returned {} holdout and {} path values, expected {test_len} and {horizon}",
                    holdout.len(),
                    path.len()
                )));
            }

            tracing::debug!(
                model = %kind,
                train_len = train.len(),
                test_len,
                horizon,
                "model forecast complete"
            );
            Ok(ModelRun {
                model: kind,
                holdout,
                path,
            })
        })
        .collect()
}
