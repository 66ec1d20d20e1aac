use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::data_source::{
    DataSource, HistoryRequest, HistoryWindow, RawBar, RawHistory, SourceError,
};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, NoopHttpClient};
use crate::retry::RetryConfig;
use crate::{IsoDate, Symbol};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo Finance chart adapter.
///
/// With a mock transport (see [`HttpClient::is_mock`]) it serves deterministic
/// synthetic weekday history instead of calling the network.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    retry: RetryConfig,
    timeout_ms: u64,
    base_url: String,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            auth: HttpAuth::None,
            retry: RetryConfig::default(),
            timeout_ms: 10_000,
            base_url: String::from(DEFAULT_BASE_URL),
        }
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, auth: HttpAuth) -> Self {
        Self {
            http_client,
            auth,
            ..Self::default()
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    fn chart_url(&self, req: &HistoryRequest) -> String {
        let window = match req.window {
            HistoryWindow::Lookback(lookback) => format!("range={lookback}"),
            HistoryWindow::Since(start) => format!(
                "period1={}&period2={}",
                unix_midnight(start.into_inner()),
                OffsetDateTime::now_utc().unix_timestamp()
            ),
        };

        format!(
            "{}/v8/finance/chart/{}?interval=1d&includePrePost=false&{}",
            self.base_url,
            urlencoding::encode(req.symbol.as_str()),
            window
        )
    }

    async fn fetch_real_history(&self, req: &HistoryRequest) -> Result<RawHistory, SourceError> {
        let endpoint = self.chart_url(req);
        tracing::debug!(symbol = %req.symbol, endpoint = %endpoint, "fetching yahoo chart");

        let body = self.fetch_with_retry(&endpoint, &req.symbol).await?;
        parse_chart(&body, &req.symbol)
    }

    /// One attempt plus at most one retry on transient failures.
    async fn fetch_with_retry(&self, endpoint: &str, symbol: &Symbol) -> Result<String, SourceError> {
        let attempts = self.retry.attempts();
        let mut last_error = SourceError::unavailable("yahoo request was not attempted");

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.retry.next_delay();
                tracing::warn!(
                    symbol = %symbol,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %last_error,
                    "retrying yahoo chart request"
                );
                tokio::time::sleep(delay).await;
            }

            let request = HttpRequest::get(endpoint)
                .with_header("referer", "https://finance.yahoo.com/")
                .with_auth(&self.auth)
                .with_timeout_ms(self.timeout_ms);

            match self.http_client.execute(request).await {
                Ok(response) if response.is_success() => return Ok(response.body),
                Ok(response) if response.status == 404 => {
                    return Err(SourceError::not_found(format!("No data found for {symbol}")));
                }
                Ok(response) if self.retry.should_retry_status(response.status) => {
                    last_error = if response.status == 429 {
                        SourceError::rate_limited("yahoo rate limited the chart request")
                    } else {
                        SourceError::unavailable(format!(
                            "yahoo returned status {}",
                            response.status
                        ))
                    };
                }
                Ok(response) if (400..500).contains(&response.status) => {
                    return Err(SourceError::invalid_request(format!(
                        "yahoo rejected the request for {symbol} with status {}",
                        response.status
                    )));
                }
                Ok(response) => {
                    return Err(SourceError::internal(format!(
                        "yahoo returned status {}",
                        response.status
                    )));
                }
                Err(error) if error.retryable() => {
                    last_error =
                        SourceError::unavailable(format!("yahoo transport error: {}", error.message()));
                }
                Err(error) => {
                    return Err(SourceError::internal(format!(
                        "yahoo transport error: {}",
                        error.message()
                    )));
                }
            }
        }

        Err(last_error)
    }

    fn synthetic_history(&self, req: &HistoryRequest) -> RawHistory {
        let today = OffsetDateTime::now_utc().date();
        let dates = match req.window {
            HistoryWindow::Lookback(lookback) => {
                trailing_weekdays(today, lookback.approx_sessions())
            }
            HistoryWindow::Since(start) => weekdays_between(start.into_inner(), today),
        };

        let seed = symbol_seed(&req.symbol);
        let mut rng = StdRng::seed_from_u64(seed);
        let base = 40.0 + (seed % 2_000) as f64 / 10.0;
        let bars = dates
            .into_iter()
            .enumerate()
            .map(|(index, date)| {
                let step = index as f64;
                let wobble = ((seed % 97) as f64 + step * 0.37).sin() * 0.012;
                let noise = rng.gen_range(-0.01..0.01);
                let close =
                    base * (1.0 + 0.0009 * step + 0.06 * (step / 11.0).sin() + wobble + noise);
                RawBar {
                    timestamp: unix_midnight(date) + 14 * 3_600 + 30 * 60,
                    open: Some(close * 0.996),
                    high: Some(close * 1.011),
                    low: Some(close * 0.988),
                    close: Some(close),
                }
            })
            .collect();

        RawHistory {
            symbol: req.symbol.clone(),
            currency: Some(String::from("USD")),
            utc_offset_seconds: 0,
            bars,
        }
    }
}

impl DataSource for YahooAdapter {
    fn id(&self) -> &'static str {
        "yahoo"
    }

    fn daily_history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawHistory, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if self.http_client.is_mock() {
                let history = self.synthetic_history(&req);
                if history.bars.is_empty() {
                    return Err(SourceError::empty(format!("No data found for {}", req.symbol)));
                }
                Ok(history)
            } else {
                self.fetch_real_history(&req).await
            }
        })
    }
}

// Yahoo Finance chart API response structures
#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: Option<YahooChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: Option<YahooChartIndicators>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartMeta {
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    gmtoffset: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Option<Vec<Option<f64>>>,
    #[serde(default)]
    high: Option<Vec<Option<f64>>>,
    #[serde(default)]
    low: Option<Vec<Option<f64>>>,
    #[serde(default)]
    close: Option<Vec<Option<f64>>>,
}

/// Validates the chart payload shape and flattens it into rows.
fn parse_chart(body: &str, symbol: &Symbol) -> Result<RawHistory, SourceError> {
    let response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = response.chart.error {
        let detail = error.description.unwrap_or(error.code.clone());
        return Err(if error.code.eq_ignore_ascii_case("not found") {
            SourceError::not_found(format!("No data found for {symbol}: {detail}"))
        } else {
            SourceError::invalid_request(format!("yahoo chart error for {symbol}: {detail}"))
        });
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SourceError::empty(format!("No data found for {symbol}")))?;

    let meta = result.meta;
    let currency = meta.as_ref().and_then(|meta| meta.currency.clone());
    let utc_offset_seconds = meta.and_then(|meta| meta.gmtoffset).unwrap_or(0);

    let timestamps = result.timestamp.unwrap_or_default();
    if timestamps.is_empty() {
        return Err(SourceError::empty(format!("No data found for {symbol}")));
    }

    let quote = result
        .indicators
        .and_then(|indicators| indicators.quote.into_iter().next())
        .ok_or_else(|| SourceError::malformed("yahoo chart has timestamps but no quote block"))?;

    let close = quote
        .close
        .ok_or_else(|| SourceError::malformed("yahoo chart quote block has no close column"))?;
    let open = column_or_nulls("open", quote.open, timestamps.len())?;
    let high = column_or_nulls("high", quote.high, timestamps.len())?;
    let low = column_or_nulls("low", quote.low, timestamps.len())?;
    if close.len() != timestamps.len() {
        return Err(SourceError::malformed(format!(
            "yahoo close column has {} values for {} timestamps",
            close.len(),
            timestamps.len()
        )));
    }

    let bars = timestamps
        .iter()
        .enumerate()
        .map(|(index, &timestamp)| RawBar {
            timestamp,
            open: open[index],
            high: high[index],
            low: low[index],
            close: close[index],
        })
        .collect();

    Ok(RawHistory {
        symbol: symbol.clone(),
        currency,
        utc_offset_seconds,
        bars,
    })
}

fn column_or_nulls(
    name: &str,
    column: Option<Vec<Option<f64>>>,
    len: usize,
) -> Result<Vec<Option<f64>>, SourceError> {
    match column {
        None => Ok(vec![None; len]),
        Some(values) if values.len() == len => Ok(values),
        Some(values) => Err(SourceError::malformed(format!(
            "yahoo {name} column has {} values for {len} timestamps",
            values.len()
        ))),
    }
}

fn unix_midnight(date: Date) -> i64 {
    date.midnight().assume_utc().unix_timestamp()
}

fn trailing_weekdays(end: Date, count: usize) -> Vec<Date> {
    let mut dates = Vec::with_capacity(count);
    let mut cursor = Some(end);
    while dates.len() < count {
        let Some(date) = cursor else { break };
        if IsoDate::from(date).is_trading_day() {
            dates.push(date);
        }
        cursor = date.previous_day();
    }
    dates.reverse();
    dates
}

fn weekdays_between(start: Date, end: Date) -> Vec<Date> {
    let mut dates = Vec::new();
    let mut cursor = Some(start);
    while let Some(date) = cursor.filter(|date| *date <= end) {
        if IsoDate::from(date).is_trading_day() {
            dates.push(date);
        }
        cursor = date.next_day();
    }
    dates
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(byte as u64)
    })
}
