//! Behavior-driven tests for data acquisition
//!
//! These tests verify HOW the service reacts to provider responses: valid charts,
//! unknown tickers, transient failures and malformed payloads.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stockcast_core::{
    ErrorKind, ForecastConfig, ForecastError, ForecastService, HttpAuth, HttpClient, HttpError,
    HttpRequest, HttpResponse, InMemorySource, NoopHttpClient, RawBar, RawHistory, RetryConfig,
    Symbol,
};

/// Replays canned responses in order and records every request.
#[derive(Default)]
struct ScriptedHttpClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn request_count(&self) -> usize {
        self.requests.lock().expect("lock").len()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests.lock().expect("lock").push(request);
        let next = self
            .responses
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::non_retryable("script exhausted")));
        Box::pin(async move { next })
    }
}

/// Chart payload with `days` weekday sessions from Monday 2024-01-01.
fn chart_body(days: usize) -> String {
    let mut timestamps = Vec::new();
    let mut closes = Vec::new();
    let mut day = 0_i64;
    while timestamps.len() < days {
        if day % 7 < 5 {
            let i = timestamps.len() as f64;
            timestamps.push(1_704_119_400 + day * 86_400);
            closes.push(190.0 + 0.3 * i + 4.0 * (i / 5.0).sin() + ((timestamps.len() * 13) % 7) as f64 * 0.3);
        }
        day += 1;
    }

    serde_json::json!({
        "chart": {
            "result": [{
                "meta": {"currency": "USD", "symbol": "AAPL", "gmtoffset": -18000},
                "timestamp": timestamps,
                "indicators": {"quote": [{
                    "open": closes,
                    "high": closes,
                    "low": closes,
                    "close": closes,
                    "volume": vec![1_000; timestamps.len()]
                }]}
            }],
            "error": null
        }
    })
    .to_string()
}

fn fast_retry_config() -> ForecastConfig {
    ForecastConfig {
        retry: RetryConfig::fixed(Duration::from_millis(1), 1),
        ..ForecastConfig::default()
    }
}

fn yahoo_service(client: Arc<ScriptedHttpClient>) -> ForecastService {
    ForecastService::with_yahoo(fast_retry_config(), client, HttpAuth::None).expect("valid config")
}

// =============================================================================
// Data Provider: Valid Response Handling
// =============================================================================

#[tokio::test]
async fn when_yahoo_returns_a_valid_chart_forecast_uses_its_closes() {
    // Given: a chart with 100 weekday sessions ending Friday 2024-05-17
    let client = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json(chart_body(100)))]);
    let service = yahoo_service(client.clone());

    // When: a forecast is requested for the following Monday
    let report = service
        .forecast("AAPL", "2024-05-20")
        .await
        .expect("forecast should succeed");

    // Then: the series ends on the last chart session and one call was made
    assert_eq!(report.horizon, 1);
    assert_eq!(report.currency, "USD");
    assert_eq!(
        report.history.last().map(|point| point.date.to_string()),
        Some(String::from("2024-05-17"))
    );
    assert_eq!(client.request_count(), 1);
}

#[tokio::test]
async fn when_mock_transport_is_used_service_runs_offline() {
    // Given: a service wired to the no-op transport
    let service = ForecastService::with_yahoo(
        ForecastConfig::default(),
        Arc::new(NoopHttpClient),
        HttpAuth::None,
    )
    .expect("valid config");

    // When: requesting indicators
    let report = service.analysis("msft").await.expect("analysis should succeed");

    // Then: deterministic synthetic history produces rows
    assert_eq!(report.ticker.as_str(), "MSFT");
    assert!(!report.data.is_empty());
}

// =============================================================================
// Data Provider: Error Handling
// =============================================================================

#[tokio::test]
async fn when_ticker_is_unknown_forecast_reports_no_data() {
    // Given: Yahoo answers with a chart-level "Not Found" error
    let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
    let client = ScriptedHttpClient::new(vec![Ok(HttpResponse::with_status(200, body))]);
    let service = yahoo_service(client);

    // When: forecasting
    let error = service
        .forecast("ZZZZZZ", "2030-01-01")
        .await
        .expect_err("unknown ticker must fail");

    // Then: a client-side DataUnavailable error mentions the ticker
    assert_eq!(error.kind(), ErrorKind::DataUnavailable);
    assert!(error.to_string().contains("No data found for ZZZZZZ"));
}

#[tokio::test]
async fn when_first_attempt_times_out_service_retries_once() {
    let client = ScriptedHttpClient::new(vec![
        Err(HttpError::new("request timeout")),
        Ok(HttpResponse::ok_json(chart_body(80))),
    ]);
    let service = yahoo_service(client.clone());

    let report = service.analysis("AAPL").await.expect("retry should recover");

    assert_eq!(report.data.len(), 80 - 19);
    assert_eq!(client.request_count(), 2);
}

#[tokio::test]
async fn when_provider_keeps_failing_service_gives_up_after_one_retry() {
    let client = ScriptedHttpClient::new(vec![
        Ok(HttpResponse::with_status(503, "unavailable")),
        Ok(HttpResponse::with_status(503, "unavailable")),
        Ok(HttpResponse::ok_json(chart_body(80))),
    ]);
    let service = yahoo_service(client.clone());

    let error = service
        .forecast("AAPL", "2030-01-01")
        .await
        .expect_err("exhausted retries must fail");

    assert_eq!(error.kind(), ErrorKind::Internal);
    assert!(!error.is_client_error());
    assert_eq!(client.request_count(), 2);
}

#[tokio::test]
async fn when_chart_columns_disagree_in_length_error_is_internal() {
    let body = chart_body(60).replacen("\"close\":[", "\"close\":[1.0,", 1);
    let client = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json(body))]);
    let service = yahoo_service(client);

    let error = service
        .analysis("AAPL")
        .await
        .expect_err("shape mismatch must fail");

    assert!(matches!(error, ForecastError::Internal(_)));
}

// =============================================================================
// Data Provider: Row Normalization
// =============================================================================

#[tokio::test]
async fn when_rows_repeat_a_date_only_the_last_one_is_kept() {
    // Given: 60 sessions plus a late duplicate of the final session
    let mut bars: Vec<RawBar> = (0..84_i64)
        .filter(|day| day % 7 < 5)
        .map(|day| {
            let close = 50.0 + day as f64 * 0.1 + (day as f64 / 3.0).cos();
            RawBar {
                timestamp: 1_704_119_400 + day * 86_400,
                open: None,
                high: None,
                low: None,
                close: Some(close),
            }
        })
        .collect();
    let last = bars[bars.len() - 1];
    bars.push(RawBar {
        timestamp: last.timestamp + 3_600,
        close: Some(99.0),
        ..last
    });
    bars.push(RawBar {
        timestamp: last.timestamp + 7_200,
        close: None,
        ..last
    });

    let source = InMemorySource::new(RawHistory {
        symbol: Symbol::parse("IBM").expect("valid symbol"),
        currency: None,
        utc_offset_seconds: 0,
        bars,
    });
    let service =
        ForecastService::new(ForecastConfig::default(), Arc::new(source)).expect("valid config");

    // When: requesting indicators
    let report = service.analysis("IBM").await.expect("analysis should succeed");

    // Then: one row per date and the duplicate's close wins
    assert_eq!(report.data.len(), 60 - 19);
    assert_eq!(report.data.last().map(|row| row.close), Some(99.0));
}
