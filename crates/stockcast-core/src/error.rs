use thiserror::Error;

use crate::data_source::{SourceError, SourceErrorKind};
use crate::domain::IsoDate;

/// Validation errors raised while constructing domain values and configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("invalid lookback '{value}', expected one of 1mo, 3mo, 6mo, 1y, 2y, 5y, max")]
    InvalidLookback { value: String },
    #[error("invalid ARIMA order '{value}', expected p,d,q with d <= 2")]
    InvalidArimaOrder { value: String },
    #[error("invalid holdout policy '{value}', expected a ratio in (0, 1) or a fixed count like 'last:30'")]
    InvalidHoldout { value: String },
    #[error("invalid model '{value}', expected one of arima, dt, rf")]
    InvalidModel { value: String },
    #[error("at least one forecasting model must be enabled")]
    NoModelsEnabled,
    #[error("field '{field}' must be greater than zero")]
    NonPositive { field: &'static str },

    #[error("series dates must be strictly increasing: {previous} then {next}")]
    UnorderedDates { previous: IsoDate, next: IsoDate },
    #[error("close on {date} must be finite and positive, got {value}")]
    InvalidClose { date: IsoDate, value: f64 },
}

/// Coarse classification of pipeline failures.
///
/// Client kinds describe a problem with the request or with the data the request asked
/// for; server kinds describe a fault the caller cannot fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    DataUnavailable,
    InvalidTargetDate,
    InsufficientData,
    ModelFit,
    Internal,
}

impl ErrorKind {
    pub const fn is_client_error(self) -> bool {
        matches!(
            self,
            Self::Validation | Self::DataUnavailable | Self::InvalidTargetDate | Self::InsufficientData
        )
    }
}

/// Error produced by any stage of the forecasting pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    DataUnavailable(String),

    #[error("target date {target} must be after the last available date {last}")]
    InvalidTargetDate { target: IsoDate, last: IsoDate },

    #[error("no trading day falls between {last} and {target}")]
    NoTradingDays { target: IsoDate, last: IsoDate },

    #[error("insufficient data: {required} observations required, {actual} available")]
    InsufficientData { required: usize, actual: usize },

    #[error("model '{model}' failed: {reason}")]
    ModelFit { model: String, reason: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ForecastError {
    pub fn data_unavailable(message: impl Into<String>) -> Self {
        Self::DataUnavailable(message.into())
    }

    pub fn model_fit(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ModelFit {
            model: model.into(),
            reason: reason.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::DataUnavailable(_) => ErrorKind::DataUnavailable,
            Self::InvalidTargetDate { .. } | Self::NoTradingDays { .. } => {
                ErrorKind::InvalidTargetDate
            }
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
            Self::ModelFit { .. } => ErrorKind::ModelFit,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub const fn is_client_error(&self) -> bool {
        self.kind().is_client_error()
    }

    pub const fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "forecast.validation",
            ErrorKind::DataUnavailable => "forecast.data_unavailable",
            ErrorKind::InvalidTargetDate => "forecast.invalid_target_date",
            ErrorKind::InsufficientData => "forecast.insufficient_data",
            ErrorKind::ModelFit => "forecast.model_fit",
            ErrorKind::Internal => "forecast.internal",
        }
    }
}

impl From<SourceError> for ForecastError {
    fn from(error: SourceError) -> Self {
        match error.kind() {
            SourceErrorKind::NotFound | SourceErrorKind::Empty => {
                Self::DataUnavailable(error.message().to_owned())
            }
            SourceErrorKind::InvalidRequest => Self::DataUnavailable(error.message().to_owned()),
            SourceErrorKind::Unavailable
            | SourceErrorKind::RateLimited
            | SourceErrorKind::Malformed
            | SourceErrorKind::Internal => Self::Internal(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_kinds_are_classified() {
        let error = ForecastError::InsufficientData {
            required: 36,
            actual: 10,
        };
        assert!(error.is_client_error());
        assert_eq!(error.code(), "forecast.insufficient_data");

        let error = ForecastError::model_fit("arima", "singular matrix");
        assert!(!error.is_client_error());
        assert_eq!(error.kind(), ErrorKind::ModelFit);
    }

    #[test]
    fn unknown_ticker_maps_to_data_unavailable() {
        let error = ForecastError::from(SourceError::not_found("no data found for ZZZZ"));
        assert_eq!(error.kind(), ErrorKind::DataUnavailable);
        assert_eq!(error.to_string(), "no data found for ZZZZ");
    }

    #[test]
    fn transport_failures_map_to_internal() {
        let error = ForecastError::from(SourceError::unavailable("yahoo returned status 503"));
        assert_eq!(error.kind(), ErrorKind::Internal);
    }
}
