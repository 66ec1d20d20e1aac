use std::sync::Arc;

use clap::Parser;
use stockcast_core::{
    ArimaOrder, ForecastConfig, ForecastService, HoldoutPolicy, HttpAuth, HttpClient, IsoDate,
    Lookback, ModelKind, NoopHttpClient, ReqwestHttpClient,
};
use stockcast_web::{router, AppState};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Stock price forecasting service.
#[derive(Debug, Parser)]
#[command(name = "stockcast-web", version, about = "Stock price forecasting HTTP service")]
struct Args {
    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 5001)]
    port: u16,

    /// Serve synthetic history instead of calling Yahoo.
    #[arg(long, env = "STOCKCAST_MOCK", default_value_t = false)]
    mock: bool,

    /// Upstream fetch timeout in milliseconds.
    #[arg(long, env = "STOCKCAST_TIMEOUT_MS", default_value_t = 10_000)]
    timeout_ms: u64,

    /// Train ratio (`0.8`) or fixed holdout (`last:30`).
    #[arg(long, env = "STOCKCAST_HOLDOUT", default_value = "0.8")]
    holdout: HoldoutPolicy,

    /// ARIMA order as `p,d,q`.
    #[arg(long, env = "STOCKCAST_ARIMA_ORDER", default_value = "5,1,0")]
    arima_order: ArimaOrder,

    /// Enabled models, comma separated.
    #[arg(
        long,
        env = "STOCKCAST_MODELS",
        value_delimiter = ',',
        default_value = "arima,dt,rf"
    )]
    models: Vec<ModelKind>,

    /// Provider range fetched per request.
    #[arg(long, env = "STOCKCAST_LOOKBACK", default_value = "6mo")]
    lookback: Lookback,

    /// Fetch history from this date (YYYY-MM-DD) instead of the lookback range.
    #[arg(long, env = "STOCKCAST_SINCE")]
    since: Option<IsoDate>,

    /// Keep only this many trailing observations before modeling.
    #[arg(long, env = "STOCKCAST_SERIES_WINDOW")]
    series_window: Option<usize>,
}

impl Args {
    fn config(&self) -> ForecastConfig {
        ForecastConfig {
            lookback: self.lookback,
            since: self.since,
            series_window: self.series_window,
            fetch_timeout_ms: self.timeout_ms,
            ..ForecastConfig::default()
        }
        .with_holdout(self.holdout)
        .with_arima_order(self.arima_order)
        .with_models(self.models.clone())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let http_client: Arc<dyn HttpClient> = if args.mock {
        Arc::new(NoopHttpClient)
    } else {
        Arc::new(ReqwestHttpClient::new())
    };
    let service = ForecastService::with_yahoo(args.config(), http_client, HttpAuth::from_env())?;
    tracing::info!(
        source = service.source_id(),
        mock = args.mock,
        models = ?service.config().models,
        arima_order = %service.config().model_settings.arima_order,
        holdout = %service.config().holdout,
        "forecast service configured"
    );

    let app = router(AppState::new(service));
    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
