//! # Stockcast Web
//!
//! axum service exposing the forecasting pipeline over JSON.
//!
//! | Route | Method | Description |
//! |-------|--------|-------------|
//! | `/forecast`, `/api/forecast` | POST | `{ticker, target_date}` to a forecast report |
//! | `/analysis`, `/api/analysis` | POST | `{ticker}` to technical indicator rows |
//! | `/health` | GET | Liveness and version |
//!
//! Errors are returned as `{"error": "..."}`: 400 for problems with the request or the
//! requested data, 500 with a generic message for everything else.

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use stockcast_core::ForecastService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ForecastService>,
}

impl AppState {
    pub fn new(service: ForecastService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Builds the router with permissive CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/forecast", post(routes::forecast))
        .route("/api/forecast", post(routes::forecast))
        .route("/analysis", post(routes::analysis))
        .route("/api/analysis", post(routes::analysis))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use stockcast_core::{ForecastConfig, InMemorySource, RawBar, RawHistory, Symbol};
    use tower::ServiceExt;

    /// 120 weekday sessions from Monday 2024-01-01, ending Friday 2024-06-14.
    fn app() -> Router {
        let bars = (0..168_i64)
            .filter(|day| day % 7 < 5)
            .enumerate()
            .map(|(i, day)| {
                let x = i as f64;
                let close = 75.0 + 0.15 * x + 2.5 * (x / 4.0).sin() + ((i * 5) % 9) as f64 * 0.1;
                RawBar {
                    timestamp: 1_704_119_400 + day * 86_400,
                    open: None,
                    high: None,
                    low: None,
                    close: Some(close),
                }
            })
            .collect();
        let source = InMemorySource::new(RawHistory {
            symbol: Symbol::parse("NVDA").expect("symbol"),
            currency: Some(String::from("USD")),
            utc_offset_seconds: 0,
            bars,
        });
        let service =
            ForecastService::new(ForecastConfig::default(), Arc::new(source)).expect("service");
        router(AppState::new(service))
    }

    async fn post_json(uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .expect("request");
        let response = app().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn forecast_returns_report_for_valid_request() {
        let (status, body) = post_json(
            "/forecast",
            r#"{"ticker": "nvda", "target_date": "2024-06-19"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ticker"], "NVDA");
        assert_eq!(body["currency"], "USD");
        assert_eq!(body["target_date"], "2024-06-19");
        assert_eq!(body["horizon"], 3);
        for model in ["arima", "dt", "rf"] {
            assert!(body["predictions"][model].is_number(), "{model}");
            assert!(body["metrics"][model]["rmse"].is_number(), "{model}");
        }
        assert_eq!(body["residuals"].as_array().map(Vec::len), Some(24));
        assert_eq!(body["history"].as_array().map(Vec::len), Some(60));
    }

    #[tokio::test]
    async fn api_prefixed_route_is_an_alias() {
        let (status, body) = post_json(
            "/api/forecast",
            r#"{"ticker": "NVDA", "target_date": "2024-06-17"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["horizon"], 1);
    }

    #[tokio::test]
    async fn weekend_only_gap_is_a_bad_request() {
        let (status, body) = post_json(
            "/forecast",
            r#"{"ticker": "NVDA", "target_date": "2024-06-16"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn missing_fields_are_bad_requests() {
        let (status, body) = post_json("/forecast", r#"{"ticker": "NVDA"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing ticker or target_date");

        let (status, body) = post_json("/analysis", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing ticker");
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let (status, body) = post_json("/forecast", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn target_on_last_date_has_no_predictions() {
        let (status, body) = post_json(
            "/forecast",
            r#"{"ticker": "NVDA", "target_date": "2024-06-14"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("predictions").is_none());
        assert!(body["error"]
            .as_str()
            .is_some_and(|message| message.contains("must be after")));
    }

    #[tokio::test]
    async fn unknown_ticker_is_a_bad_request() {
        let (status, body) = post_json(
            "/forecast",
            r#"{"ticker": "MSFT", "target_date": "2024-06-19"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No data found for MSFT");
    }

    #[tokio::test]
    async fn analysis_returns_indicator_rows() {
        let (status, body) = post_json("/api/analysis", r#"{"ticker": "NVDA"}"#).await;

        assert_eq!(status, StatusCode::OK);
        let rows = body["data"].as_array().expect("rows");
        assert_eq!(rows.len(), 120 - 19);
        for key in ["date", "close", "sma_20", "ema_20", "rsi", "macd", "signal", "bb_upper", "bb_lower"] {
            assert!(rows[0].get(key).is_some(), "{key}");
        }
    }

    #[tokio::test]
    async fn health_reports_version() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request");
        let response = app().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
