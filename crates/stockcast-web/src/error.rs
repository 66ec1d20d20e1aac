use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use stockcast_core::ForecastError;
use thiserror::Error;

/// Message returned for every server-side failure; details go to the log only.
pub const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors surfaced by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body is not usable JSON or lacks required fields.
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forecast(error) if error.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Forecast(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            if let Self::Forecast(error) = &self {
                tracing::error!(code = error.code(), error = %error, "request failed");
            }
            String::from(INTERNAL_MESSAGE)
        } else {
            tracing::debug!(error = %self, "request rejected");
            self.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_kinds_map_to_bad_request() {
        let error = ApiError::from(ForecastError::InsufficientData {
            required: 36,
            actual: 10,
        });
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::BadRequest(String::from("Missing ticker")).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn server_kinds_map_to_internal_error() {
        let error = ApiError::from(ForecastError::model_fit("arima", "singular"));
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ApiError::from(ForecastError::internal("oops")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
