//! Response assembly. Pure aggregation of values computed by earlier stages.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ensemble::ModelRun;
use crate::horizon::Horizon;
use crate::indicators::IndicatorRow;
use crate::metrics::{ModelMetrics, ResidualRecord};
use crate::models::ModelKind;
use crate::{ForecastError, IsoDate, PricePoint, PriceSeries, Symbol};

/// Currency reported when the provider does not name one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Complete answer to one forecast request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub ticker: Symbol,
    pub currency: String,
    /// Resolved target, snapped back to a weekday when needed.
    pub target_date: IsoDate,
    /// Trading days between the last observation and `target_date`.
    pub horizon: usize,
    pub predictions: BTreeMap<ModelKind, f64>,
    pub forecast_paths: BTreeMap<ModelKind, Vec<f64>>,
    pub metrics: BTreeMap<ModelKind, ModelMetrics>,
    pub residuals: Vec<ResidualRecord>,
    pub history: Vec<PricePoint>,
}

/// Indicator rows for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub ticker: Symbol,
    pub data: Vec<IndicatorRow>,
}

/// Inputs gathered by the pipeline for [`assemble_forecast`].
#[derive(Debug)]
pub struct ForecastParts<'a> {
    pub ticker: Symbol,
    pub currency: Option<String>,
    pub horizon: &'a Horizon,
    pub runs: Vec<ModelRun>,
    pub metrics: BTreeMap<ModelKind, ModelMetrics>,
    pub residuals: Vec<ResidualRecord>,
    pub series: &'a PriceSeries,
    pub history_window: usize,
}

/// Builds the report; each prediction is the last value of its model's path.
pub fn assemble_forecast(parts: ForecastParts<'_>) -> Result<ForecastReport, ForecastError> {
    let mut predictions = BTreeMap::new();
    let mut forecast_paths = BTreeMap::new();
    for run in parts.runs {
        if run.path.len() != parts.horizon.steps {
            return Err(ForecastError::internal(format!(
                "model '{}' produced {} path values for a horizon of {}",
                run.model,
                run.path.len(),
                parts.horizon.steps
            )));
        }
        let prediction = run.prediction().ok_or_else(|| {
            ForecastError::internal(format!("model '{}' produced an empty path", run.model))
        })?;
        predictions.insert(run.model, prediction);
        forecast_paths.insert(run.model, run.path);
    }

    Ok(ForecastReport {
        ticker: parts.ticker,
        currency: parts
            .currency
            .unwrap_or_else(|| String::from(DEFAULT_CURRENCY)),
        target_date: parts.horizon.target,
        horizon: parts.horizon.steps,
        predictions,
        forecast_paths,
        metrics: parts.metrics,
        residuals: parts.residuals,
        history: parts.series.tail(parts.history_window).to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(value: &str) -> IsoDate {
        IsoDate::parse(value).expect("date")
    }

    #[test]
    fn prediction_is_last_path_value_and_currency_defaults() {
        let series = PriceSeries::new(vec![
            PricePoint::new(day("2024-01-09"), 10.0),
            PricePoint::new(day("2024-01-10"), 11.0),
        ])
        .expect("series");
        let horizon = Horizon {
            steps: 2,
            target: day("2024-01-12"),
            trading_days: vec![day("2024-01-11"), day("2024-01-12")],
        };

        let report = assemble_forecast(ForecastParts {
            ticker: Symbol::parse("aapl").expect("symbol"),
            currency: None,
            horizon: &horizon,
            runs: vec![ModelRun {
                model: ModelKind::DecisionTree,
                holdout: vec![],
                path: vec![11.5, 12.5],
            }],
            metrics: BTreeMap::new(),
            residuals: Vec::new(),
            series: &series,
            history_window: 1,
        })
        .expect("report");

        assert_eq!(report.currency, "USD");
        assert_eq!(report.predictions[&ModelKind::DecisionTree], 12.5);
        assert_eq!(report.history, vec![PricePoint::new(day("2024-01-10"), 11.0)]);

        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["ticker"], "AAPL");
        assert_eq!(json["target_date"], "2024-01-12");
        assert_eq!(json["predictions"]["dt"], 12.5);
        assert_eq!(json["history"][0]["close"], 11.0);
    }

    #[test]
    fn path_shorter_than_horizon_is_internal() {
        let series =
            PriceSeries::new(vec![PricePoint::new(day("2024-01-10"), 11.0)]).expect("series");
        let horizon = Horizon {
            steps: 3,
            target: day("2024-01-15"),
            trading_days: Vec::new(),
        };
        let error = assemble_forecast(ForecastParts {
            ticker: Symbol::parse("AAPL").expect("symbol"),
            currency: Some(String::from("EUR")),
            horizon: &horizon,
            runs: vec![ModelRun {
                model: ModelKind::Arima,
                holdout: vec![],
                path: vec![1.0],
            }],
            metrics: BTreeMap::new(),
            residuals: Vec::new(),
            series: &series,
            history_window: 60,
        })
        .expect_err("must fail");
        assert!(matches!(error, ForecastError::Internal(_)));
    }
}
