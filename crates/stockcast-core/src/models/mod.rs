//! # Forecasting Models
//!
//! Every model family implements [`ForecastModel`]. Fitting consumes only the training
//! closes and yields a [`FittedModel`] owned by a single pipeline run.
//!
//! | Model | Name | Description |
//! |-------|------|-------------|
//! | [`Arima`] | `arima` | ARIMA(p,d,q) fitted by conditional least squares |
//! | [`DecisionTree`] | `dt` | Squared-error regression tree on the observation index |
//! | [`RandomForest`] | `rf` | Bagged regression trees on the observation index |
//!
//! The tree models regress price on position, so every index past the training range
//! lands in the right-most leaves and their forecast paths are flat.

mod arima;
mod forest;
mod linalg;
mod tree;

use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ForecastError, ValidationError};

pub use arima::{Arima, ArimaOrder};
pub use forest::RandomForest;
pub use tree::DecisionTree;

/// Identifier of a model family, used as the key in every per-model response map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    #[serde(rename = "arima")]
    Arima,
    #[serde(rename = "dt")]
    DecisionTree,
    #[serde(rename = "rf")]
    RandomForest,
}

impl ModelKind {
    pub const ALL: [Self; 3] = [Self::Arima, Self::DecisionTree, Self::RandomForest];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arima => "arima",
            Self::DecisionTree => "dt",
            Self::RandomForest => "rf",
        }
    }
}

impl Display for ModelKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "arima" => Ok(Self::Arima),
            "dt" | "decision_tree" => Ok(Self::DecisionTree),
            "rf" | "random_forest" => Ok(Self::RandomForest),
            _ => Err(ValidationError::InvalidModel {
                value: value.to_owned(),
            }),
        }
    }
}

/// An unfitted model family with its static hyper-parameters.
pub trait ForecastModel: Send + Sync {
    fn kind(&self) -> ModelKind;

    /// Smallest training length the model can be fitted on.
    fn min_train_len(&self) -> usize;

    /// Fits the model on `train`, ordered oldest first.
    ///
    /// # Errors
    ///
    /// [`ForecastError::ModelFit`] when the parameters cannot be estimated.
    fn fit(&self, train: &[f64]) -> Result<Box<dyn FittedModel>, ForecastError>;
}

/// A fitted model, able to continue the series right after its training range.
pub trait FittedModel: Send + Debug {
    /// Returns `steps` point forecasts in one call, in order.
    ///
    /// # Errors
    ///
    /// [`ForecastError::ModelFit`] when the recursion produces non-finite values.
    fn forecast(&self, steps: usize) -> Result<Vec<f64>, ForecastError>;

    /// Predictions for the `horizon` trading days after the last observation, when
    /// `test_len` held-out observations follow the training range.
    ///
    /// The default predicts at the positions after the holdout.
    fn horizon_path(&self, test_len: usize, horizon: usize) -> Result<Vec<f64>, ForecastError> {
        let mut values = self.forecast(test_len + horizon)?;
        Ok(values.split_off(test_len.min(values.len())))
    }
}

/// Static settings shared by the model families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    pub arima_order: ArimaOrder,
    pub forest_trees: usize,
    pub seed: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            arima_order: ArimaOrder::default(),
            forest_trees: 100,
            seed: 42,
        }
    }
}

/// Instantiates the requested families, in the order given.
pub fn build(kinds: &[ModelKind], settings: &ModelSettings) -> Vec<Box<dyn ForecastModel>> {
    kinds
        .iter()
        .map(|kind| -> Box<dyn ForecastModel> {
            match kind {
                ModelKind::Arima => Box::new(Arima::new(settings.arima_order)),
                ModelKind::DecisionTree => Box::new(DecisionTree::new()),
                ModelKind::RandomForest => {
                    Box::new(RandomForest::new(settings.forest_trees, settings.seed))
                }
            }
        })
        .collect()
}
