//! # Stockcast Core
//!
//! Price acquisition, forecasting models and evaluation for the stockcast toolkit.
//!
//! ## Overview
//!
//! Given a ticker and a future calendar date, the pipeline fetches daily closes, holds the
//! most recent part of the series out, fits several independent model families on the
//! rest, scores them on the holdout and reports each model's price for the target date.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo chart API) |
//! | [`config`] | Static pipeline configuration |
//! | [`data_source`] | Data source trait and raw history types |
//! | [`domain`] | Domain values (Symbol, IsoDate, PriceSeries) |
//! | [`ensemble`] | Fits models and splits their forecasts |
//! | [`error`] | Validation and pipeline error types |
//! | [`horizon`] | Target date to trading-day steps |
//! | [`http_client`] | HTTP client abstraction |
//! | [`indicators`] | SMA, EMA, RSI, MACD and Bollinger bands |
//! | [`metrics`] | RMSE, MAPE and residuals |
//! | [`models`] | ARIMA, decision tree and random forest |
//! | [`preprocess`] | Raw rows to a canonical close series |
//! | [`report`] | Response assembly |
//! | [`retry`] | Fetch retry policy |
//! | [`service`] | Request orchestration |
//! | [`split`] | Chronological train/test partition |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockcast_core::{ForecastConfig, ForecastService, HttpAuth, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = ForecastService::with_yahoo(
//!         ForecastConfig::default(),
//!         Arc::new(ReqwestHttpClient::new()),
//!         HttpAuth::from_env(),
//!     )?;
//!
//!     let report = service.forecast("AAPL", "2030-01-15").await?;
//!     for (model, price) in &report.predictions {
//!         println!("{model}: {price:.2}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Data Source     │────▶│ HTTP Client      │
//! │ (Adapter Trait) │     │ (reqwest/none)   │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Preprocess      │────▶│ Horizon Resolver │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Split           │────▶│ Model Ensemble   │
//! └─────────────────┘     └────────┬─────────┘
//!                                  │
//!                                  ▼
//!                         ┌──────────────────┐
//!                         │ Metrics / Report │
//!                         └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Every stage returns `Result<_, ForecastError>`. Front ends decide status codes from
//! the error kind:
//!
//! ```rust
//! use stockcast_core::{ErrorKind, ForecastError};
//!
//! fn status(error: &ForecastError) -> u16 {
//!     match error.kind() {
//!         ErrorKind::ModelFit | ErrorKind::Internal => 500,
//!         _ => 400,
//!     }
//! }
//! ```

pub mod adapters;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod ensemble;
pub mod error;
pub mod horizon;
pub mod http_client;
pub mod indicators;
pub mod metrics;
pub mod models;
pub mod preprocess;
pub mod report;
pub mod retry;
pub mod service;
pub mod split;

// Adapter implementations
pub use adapters::YahooAdapter;

// Configuration
pub use config::ForecastConfig;

// Data source trait and types
pub use data_source::{
    DataSource, HistoryRequest, HistoryWindow, InMemorySource, Lookback, RawBar, RawHistory,
    SourceError, SourceErrorKind,
};

// Domain models
pub use domain::{IsoDate, PricePoint, PriceSeries, Symbol};

// Error types
pub use error::{ErrorKind, ForecastError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};

// Pipeline stages
pub use ensemble::ModelRun;
pub use horizon::Horizon;
pub use indicators::IndicatorRow;
pub use metrics::{ModelMetrics, ResidualRecord};
pub use models::{ArimaOrder, ModelKind, ModelSettings};
pub use report::{AnalysisReport, ForecastReport};
pub use retry::RetryConfig;
pub use service::{forecast_series, ForecastService};
pub use split::{HoldoutPolicy, Split};
