//! Request handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use stockcast_core::{AnalysisReport, ForecastReport};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub target_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub ticker: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

pub async fn forecast(
    State(state): State<AppState>,
    payload: Result<Json<ForecastRequest>, JsonRejection>,
) -> Result<Json<ForecastReport>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let (Some(ticker), Some(target_date)) = (present(request.ticker), present(request.target_date))
    else {
        return Err(ApiError::BadRequest(String::from(
            "Missing ticker or target_date",
        )));
    };

    let report = state.service.forecast(&ticker, &target_date).await?;
    Ok(Json(report))
}

pub async fn analysis(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let Some(ticker) = present(request.ticker) else {
        return Err(ApiError::BadRequest(String::from("Missing ticker")));
    };

    let report = state.service.analysis(&ticker).await?;
    Ok(Json(report))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
