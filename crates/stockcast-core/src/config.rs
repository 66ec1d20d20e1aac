//! Static pipeline configuration, fixed for the lifetime of a service.

use crate::data_source::{HistoryWindow, Lookback};
use crate::models::{ArimaOrder, ModelKind, ModelSettings};
use crate::retry::RetryConfig;
use crate::split::HoldoutPolicy;
use crate::{IsoDate, ValidationError};

/// Every tunable of the forecasting pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub holdout: HoldoutPolicy,
    /// Enabled model families, in response order.
    pub models: Vec<ModelKind>,
    pub model_settings: ModelSettings,
    /// Trailing observations echoed back as `history`.
    pub history_window: usize,
    /// Keep only this many trailing observations after preprocessing.
    pub series_window: Option<usize>,
    pub lookback: Lookback,
    /// Fetch from this date instead of `lookback` when set.
    pub since: Option<IsoDate>,
    /// Shortest series the pipeline will model.
    pub min_observations: usize,
    pub fetch_timeout_ms: u64,
    pub retry: RetryConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            holdout: HoldoutPolicy::default(),
            models: ModelKind::ALL.to_vec(),
            model_settings: ModelSettings::default(),
            history_window: 60,
            series_window: None,
            lookback: Lookback::SixMonths,
            since: None,
            min_observations: 36,
            fetch_timeout_ms: 10_000,
            retry: RetryConfig::default(),
        }
    }
}

impl ForecastConfig {
    pub fn with_arima_order(mut self, order: ArimaOrder) -> Self {
        self.model_settings.arima_order = order;
        self
    }

    pub fn with_holdout(mut self, holdout: HoldoutPolicy) -> Self {
        self.holdout = holdout;
        self
    }

    pub fn with_models(mut self, models: Vec<ModelKind>) -> Self {
        self.models = models;
        self
    }

    /// Provider window requested for every ticker.
    pub fn fetch_window(&self) -> HistoryWindow {
        self.since
            .map_or(HistoryWindow::Lookback(self.lookback), HistoryWindow::Since)
    }

    /// Checks cross-field constraints and drops duplicate model entries.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.holdout.validate()?;

        let mut seen = Vec::with_capacity(self.models.len());
        self.models.retain(|kind| {
            let fresh = !seen.contains(kind);
            seen.push(*kind);
            fresh
        });
        if self.models.is_empty() {
            return Err(ValidationError::NoModelsEnabled);
        }

        let positive = [
            ("forest_trees", self.model_settings.forest_trees as u64),
            ("history_window", self.history_window as u64),
            ("series_window", self.series_window.map_or(1, |w| w as u64)),
            ("min_observations", self.min_observations as u64),
            ("fetch_timeout_ms", self.fetch_timeout_ms),
        ];
        if let Some(&(field, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ValidationError::NonPositive { field });
        }

        Ok(self)
    }
}
