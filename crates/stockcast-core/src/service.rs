//! Request-level orchestration of the pipeline.
//!
//! [`ForecastService`] is built once at startup and shared behind an `Arc`. It holds only
//! the validated configuration and the data source; every request builds its own series,
//! split and fitted models and drops them when it returns.

use std::sync::Arc;

use crate::adapters::YahooAdapter;
use crate::config::ForecastConfig;
use crate::data_source::{DataSource, HistoryRequest};
use crate::http_client::{HttpAuth, HttpClient};
use crate::report::{AnalysisReport, ForecastParts, ForecastReport};
use crate::{
    ensemble, horizon, indicators, metrics, models, preprocess, report, split, ForecastError,
    IsoDate, PriceSeries, Symbol, ValidationError,
};

/// Runs the forecasting pipeline against a fixed series.
///
/// The horizon is resolved before any model is fitted, so an invalid target fails fast.
pub fn forecast_series(
    config: &ForecastConfig,
    ticker: Symbol,
    currency: Option<String>,
    series: &PriceSeries,
    target: IsoDate,
) -> Result<ForecastReport, ForecastError> {
    let last = series
        .last_date()
        .ok_or_else(|| ForecastError::data_unavailable(format!("No data found for {ticker}")))?;
    let horizon = horizon::resolve(last, target)?;

    let models = models::build(&config.models, &config.model_settings);
    let model_min = models
        .iter()
        .map(|model| model.min_train_len())
        .max()
        .unwrap_or(1);
    let split = split::split(
        series.points(),
        config.holdout,
        config.min_observations,
        model_min,
    )?;

    let runs = ensemble::run(
        &models,
        &split.train_closes(),
        split.test.len(),
        horizon.steps,
    )?;
    let metrics = metrics::evaluate(&split.test_closes(), &runs)?;
    let residuals = metrics::residuals(split.test, &runs)?;

    tracing::debug!(
        ticker = %ticker,
        train = split.train.len(),
        test = split.test.len(),
        horizon = horizon.steps,
        "pipeline complete"
    );

    report::assemble_forecast(ForecastParts {
        ticker,
        currency,
        horizon: &horizon,
        runs,
        metrics,
        residuals,
        series,
        history_window: config.history_window,
    })
}

/// Immutable entry point shared by the HTTP and CLI front ends.
#[derive(Clone)]
pub struct ForecastService {
    config: Arc<ForecastConfig>,
    source: Arc<dyn DataSource>,
}

impl ForecastService {
    /// Validates `config` and pairs it with `source`.
    pub fn new(config: ForecastConfig, source: Arc<dyn DataSource>) -> Result<Self, ValidationError> {
        Ok(Self {
            config: Arc::new(config.validated()?),
            source,
        })
    }

    /// Service backed by the Yahoo adapter, using the configured timeout and retry.
    pub fn with_yahoo(
        config: ForecastConfig,
        http_client: Arc<dyn HttpClient>,
        auth: HttpAuth,
    ) -> Result<Self, ValidationError> {
        let adapter = YahooAdapter::with_http_client(http_client, auth)
            .with_timeout_ms(config.fetch_timeout_ms)
            .with_retry(config.retry.clone());
        Self::new(config, Arc::new(adapter))
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn source_id(&self) -> &'static str {
        self.source.id()
    }

    /// Forecasts `ticker` for `target_date` (`YYYY-MM-DD`).
    ///
    /// # Errors
    ///
    /// Client kinds for bad input, unknown tickers, invalid targets and short series;
    /// server kinds for model failures and provider faults.
    pub async fn forecast(
        &self,
        ticker: &str,
        target_date: &str,
    ) -> Result<ForecastReport, ForecastError> {
        let symbol = parse_ticker(ticker)?;
        if target_date.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "target_date",
            }
            .into());
        }
        let target = IsoDate::parse(target_date)?;

        let (series, currency) = self.load_series(&symbol, self.config.series_window).await?;
        tracing::info!(
            ticker = %symbol,
            target = %target,
            observations = series.len(),
            "forecast requested"
        );

        let config = Arc::clone(&self.config);
        let report = tokio::task::spawn_blocking(move || {
            forecast_series(&config, symbol, currency, &series, target)
        })
        .await
        .map_err(|e| ForecastError::internal(format!("forecast worker failed: {e}")))??;

        tracing::info!(
            ticker = %report.ticker,
            target = %report.target_date,
            horizon = report.horizon,
            "forecast ready"
        );
        Ok(report)
    }

    /// Technical indicators over the full preprocessed history of `ticker`.
    pub async fn analysis(&self, ticker: &str) -> Result<AnalysisReport, ForecastError> {
        let symbol = parse_ticker(ticker)?;
        let (series, _) = self.load_series(&symbol, None).await?;
        let data = indicators::compute(&series);
        tracing::info!(ticker = %symbol, rows = data.len(), "analysis ready");
        Ok(AnalysisReport {
            ticker: symbol,
            data,
        })
    }

    async fn load_series(
        &self,
        symbol: &Symbol,
        window: Option<usize>,
    ) -> Result<(PriceSeries, Option<String>), ForecastError> {
        let request = HistoryRequest::new(symbol.clone(), self.config.fetch_window());
        let raw = self.source.daily_history(request).await.map_err(|error| {
            tracing::warn!(
                ticker = %symbol,
                source = self.source.id(),
                code = error.code(),
                error = %error,
                "history fetch failed"
            );
            ForecastError::from(error)
        })?;

        let series = preprocess::to_price_series(&raw, window)?;
        Ok((series, raw.currency))
    }
}

fn parse_ticker(ticker: &str) -> Result<Symbol, ValidationError> {
    if ticker.trim().is_empty() {
        return Err(ValidationError::MissingField { field: "ticker" });
    }
    Symbol::parse(ticker)
}
