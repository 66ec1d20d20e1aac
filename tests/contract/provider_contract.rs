use std::future::Future;
use std::sync::Arc;

use stockcast_core::{
    preprocess, DataSource, HistoryRequest, HistoryWindow, InMemorySource, IsoDate, Lookback,
    RawBar, RawHistory, SourceErrorKind, Symbol, YahooAdapter,
};

#[derive(Clone)]
struct ProviderCase {
    id: &'static str,
    source: Arc<dyn DataSource>,
    known_symbol: &'static str,
}

fn fixed_history() -> RawHistory {
    // Weekday sessions from Monday 2024-01-01, 14:30 UTC.
    let bars = (0..140_i64)
        .filter(|day| (day % 7) < 5)
        .map(|day| {
            let close = 180.0 + day as f64 * 0.25;
            RawBar {
                timestamp: 1_704_119_400 + day * 86_400,
                open: Some(close - 0.5),
                high: Some(close + 1.0),
                low: Some(close - 1.0),
                close: Some(close),
            }
        })
        .collect();

    RawHistory {
        symbol: Symbol::parse("AAPL").expect("valid symbol"),
        currency: Some(String::from("USD")),
        utc_offset_seconds: -18_000,
        bars,
    }
}

fn provider_cases() -> Vec<ProviderCase> {
    vec![
        ProviderCase {
            id: "yahoo",
            source: Arc::new(YahooAdapter::default()),
            known_symbol: "AAPL",
        },
        ProviderCase {
            id: "memory",
            source: Arc::new(InMemorySource::new(fixed_history())),
            known_symbol: "AAPL",
        },
    ]
}

fn six_month_request(symbol: &str) -> HistoryRequest {
    HistoryRequest::new(
        Symbol::parse(symbol).expect("valid symbol"),
        HistoryWindow::Lookback(Lookback::SixMonths),
    )
}

#[test]
fn sources_report_their_identifier() {
    for case in provider_cases() {
        assert_eq!(case.source.id(), case.id);
    }
}

#[test]
fn history_echoes_requested_symbol_for_all_providers() {
    for case in provider_cases() {
        let history = block_on(case.source.daily_history(six_month_request(case.known_symbol)))
            .unwrap_or_else(|error| panic!("provider '{}' history failed: {error}", case.id));

        assert_eq!(
            history.symbol.as_str(),
            case.known_symbol,
            "provider '{}': symbol",
            case.id
        );
        assert!(!history.bars.is_empty(), "provider '{}': rows", case.id);
        assert_eq!(
            history.currency.as_deref(),
            Some("USD"),
            "provider '{}': currency",
            case.id
        );
    }
}

#[test]
fn history_rows_are_chronological_with_positive_closes() {
    for case in provider_cases() {
        let history = block_on(case.source.daily_history(six_month_request(case.known_symbol)))
            .unwrap_or_else(|error| panic!("provider '{}' history failed: {error}", case.id));

        assert!(
            history
                .bars
                .windows(2)
                .all(|pair| pair[0].timestamp < pair[1].timestamp),
            "provider '{}': timestamps must increase",
            case.id
        );
        assert!(
            history
                .bars
                .iter()
                .all(|bar| bar.close.is_some_and(|close| close > 0.0)),
            "provider '{}': closes must be positive",
            case.id
        );
    }
}

#[test]
fn preprocessed_output_is_canonical_for_all_providers() {
    for case in provider_cases() {
        let history = block_on(case.source.daily_history(six_month_request(case.known_symbol)))
            .unwrap_or_else(|error| panic!("provider '{}' history failed: {error}", case.id));
        let series = preprocess::to_price_series(&history, None)
            .unwrap_or_else(|error| panic!("provider '{}' preprocess failed: {error}", case.id));

        assert_eq!(series.len(), history.bars.len(), "provider '{}': rows kept", case.id);
        assert!(
            series.points().iter().all(|point| point.date.is_trading_day()),
            "provider '{}': weekday sessions only",
            case.id
        );
    }
}

#[test]
fn in_memory_source_rejects_other_symbols() {
    let source = InMemorySource::new(fixed_history());
    let error = block_on(source.daily_history(six_month_request("MSFT")))
        .expect_err("unknown symbol must fail");
    assert_eq!(error.kind(), SourceErrorKind::NotFound);
    assert_eq!(error.message(), "No data found for MSFT");
}

#[test]
fn yahoo_synthetic_history_honours_start_date() {
    let start = IsoDate::parse("2024-01-02").expect("valid date");
    let request = HistoryRequest::new(
        Symbol::parse("MSFT").expect("valid symbol"),
        HistoryWindow::Since(start),
    );

    let history = block_on(YahooAdapter::default().daily_history(request)).expect("history");
    let series = preprocess::to_price_series(&history, None).expect("series");
    assert_eq!(series.points()[0].date, start);
}

fn block_on<F>(future: F) -> F::Output
where
    F: Future,
{
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("test runtime should build")
        .block_on(future)
}
