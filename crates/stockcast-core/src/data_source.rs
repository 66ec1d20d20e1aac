//! Data source trait and request/response types.
//!
//! A [`DataSource`] returns raw daily rows exactly as the provider reported them,
//! nulls included. Turning them into a [`PriceSeries`](crate::PriceSeries) is the job
//! of [`preprocess`](crate::preprocess).
//!
//! # Example
//!
//! ```rust,ignore
//! use stockcast_core::{DataSource, HistoryRequest, HistoryWindow, Lookback, Symbol, YahooAdapter};
//!
//! async fn fetch(adapter: &YahooAdapter) -> Result<(), stockcast_core::SourceError> {
//!     let request = HistoryRequest::new(
//!         Symbol::parse("AAPL")?,
//!         HistoryWindow::Lookback(Lookback::SixMonths),
//!     );
//!     let history = adapter.daily_history(request).await?;
//!     println!("{} rows", history.bars.len());
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{IsoDate, Symbol, ValidationError};

/// Provider lookback range for daily history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lookback {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "max")]
    Max,
}

impl Lookback {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
            Self::Max => "max",
        }
    }

    /// Approximate number of trading sessions covered by the range.
    pub const fn approx_sessions(self) -> usize {
        match self {
            Self::OneMonth => 21,
            Self::ThreeMonths => 63,
            Self::SixMonths => 126,
            Self::OneYear => 252,
            Self::TwoYears => 504,
            Self::FiveYears => 1_260,
            Self::Max => 2_520,
        }
    }
}

impl Default for Lookback {
    fn default() -> Self {
        Self::SixMonths
    }
}

impl Display for Lookback {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lookback {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1mo" => Ok(Self::OneMonth),
            "3mo" => Ok(Self::ThreeMonths),
            "6mo" => Ok(Self::SixMonths),
            "1y" => Ok(Self::OneYear),
            "2y" => Ok(Self::TwoYears),
            "5y" => Ok(Self::FiveYears),
            "max" => Ok(Self::Max),
            _ => Err(ValidationError::InvalidLookback {
                value: value.to_owned(),
            }),
        }
    }
}

/// How far back a history request reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryWindow {
    Lookback(Lookback),
    Since(IsoDate),
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::Lookback(Lookback::default())
    }
}

/// Request payload for daily history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: Symbol,
    pub window: HistoryWindow,
}

impl HistoryRequest {
    pub fn new(symbol: Symbol, window: HistoryWindow) -> Self {
        Self { symbol, window }
    }
}

/// One provider row. Any price may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    /// Unix timestamp (seconds) of the session.
    pub timestamp: i64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
}

/// Raw provider output for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHistory {
    pub symbol: Symbol,
    pub currency: Option<String>,
    /// Exchange offset from UTC, used to turn timestamps into session dates.
    pub utc_offset_seconds: i32,
    pub bars: Vec<RawBar>,
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// The provider does not know the symbol.
    NotFound,
    /// The provider answered but returned no rows.
    Empty,
    InvalidRequest,
    Unavailable,
    RateLimited,
    /// The payload did not match the expected shape.
    Malformed,
    Internal,
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    fn with_kind(kind: SourceErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::NotFound, message, false)
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::Empty, message, false)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::InvalidRequest, message, false)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::Unavailable, message, true)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::RateLimited, message, true)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::Malformed, message, false)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::Internal, message, false)
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Empty => "source.empty",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Malformed => "source.malformed",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Market-data provider contract.
///
/// Implementations must be `Send + Sync`: one adapter instance serves every request,
/// so it must not carry per-request state.
pub trait DataSource: Send + Sync {
    /// Short provider identifier used in logs.
    fn id(&self) -> &'static str;

    /// Fetches raw daily rows for the requested symbol and window.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the symbol is unknown, no rows come back, the
    /// provider is unreachable or the payload has an unexpected shape.
    fn daily_history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawHistory, SourceError>> + Send + 'a>>;
}

/// Serves one fixed history.
///
/// A [`HistoryWindow::Since`] request drops rows dated before the start; a lookback
/// returns everything. Useful offline and in tests; a request for any other symbol is
/// reported as unknown.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    history: RawHistory,
}

impl InMemorySource {
    pub fn new(history: RawHistory) -> Self {
        Self { history }
    }
}

impl DataSource for InMemorySource {
    fn id(&self) -> &'static str {
        "memory"
    }

    fn daily_history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawHistory, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if req.symbol != self.history.symbol {
                return Err(SourceError::not_found(format!(
                    "No data found for {}",
                    req.symbol
                )));
            }
            let mut history = self.history.clone();
            if let HistoryWindow::Since(start) = req.window {
                let offset = i64::from(history.utc_offset_seconds);
                history.bars.retain(|bar| {
                    OffsetDateTime::from_unix_timestamp(bar.timestamp + offset)
                        .is_ok_and(|moment| IsoDate::from(moment.date()) >= start)
                });
            }
            if history.bars.is_empty() {
                return Err(SourceError::empty(format!("No data found for {}", req.symbol)));
            }
            Ok(history)
        })
    }
}
