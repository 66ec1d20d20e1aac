//! CLI argument definitions for stockcast.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `forecast` | Forecast a ticker's close for a target date |
//! | `analysis` | Technical indicators over the fetched history |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--mock` | `false` | Use synthetic history instead of Yahoo |
//! | `--timeout-ms` | `10000` | Upstream fetch timeout in ms |
//! | `--holdout` | `0.8` | Train ratio or `last:N` |
//! | `--arima-order` | `5,1,0` | ARIMA `p,d,q` |
//! | `--models` | `arima,dt,rf` | Enabled models |
//! | `--lookback` | `6mo` | Provider range |
//! | `--since` | none | Start date, overrides `--lookback` |
//! | `--series-window` | none | Trailing observations kept for modeling |
//!
//! # Examples
//!
//! ```bash
//! stockcast forecast AAPL --target-date 2030-01-15 --pretty
//! stockcast analysis MSFT --format table
//! stockcast forecast NVDA --target-date 2030-01-15 --models arima,rf --holdout last:30
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use stockcast_core::{ArimaOrder, ForecastConfig, HoldoutPolicy, IsoDate, Lookback, ModelKind};

/// Stock price forecasting from daily closes.
#[derive(Debug, Parser)]
#[command(
    name = "stockcast",
    author,
    version,
    about = "Stock price forecasting CLI",
    long_about = "Fetches daily closes from Yahoo Finance, scores ARIMA, decision-tree and \
random-forest models on a chronological holdout and reports each model's price for a \
target date.\n\nUse 'stockcast <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Serve synthetic history instead of calling Yahoo.
    #[arg(long, global = true, env = "STOCKCAST_MOCK", default_value_t = false)]
    pub mock: bool,

    /// Upstream fetch timeout in milliseconds.
    #[arg(long, global = true, env = "STOCKCAST_TIMEOUT_MS", default_value_t = 10_000)]
    pub timeout_ms: u64,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast a ticker's close for a future date.
    Forecast(ForecastArgs),
    /// Compute technical indicators for a ticker.
    Analysis(AnalysisArgs),
}

#[derive(Debug, Args)]
pub struct ForecastArgs {
    /// Ticker symbol, e.g. AAPL.
    pub ticker: String,

    /// Target calendar date (YYYY-MM-DD).
    #[arg(long)]
    pub target_date: String,
}

#[derive(Debug, Args)]
pub struct AnalysisArgs {
    /// Ticker symbol, e.g. AAPL.
    pub ticker: String,
}

/// Pipeline tunables shared by every command.
#[derive(Debug, Args)]
pub struct ModelArgs {
    /// Train ratio (`0.8`) or fixed holdout (`last:30`).
    #[arg(long, global = true, env = "STOCKCAST_HOLDOUT", default_value = "0.8")]
    pub holdout: HoldoutPolicy,

    /// ARIMA order as `p,d,q`.
    #[arg(long, global = true, env = "STOCKCAST_ARIMA_ORDER", default_value = "5,1,0")]
    pub arima_order: ArimaOrder,

    /// Enabled models, comma separated (arima, dt, rf).
    #[arg(
        long,
        global = true,
        env = "STOCKCAST_MODELS",
        value_delimiter = ',',
        default_value = "arima,dt,rf"
    )]
    pub models: Vec<ModelKind>,

    /// Provider range (1mo, 3mo, 6mo, 1y, 2y, 5y, max).
    #[arg(long, global = true, env = "STOCKCAST_LOOKBACK", default_value = "6mo")]
    pub lookback: Lookback,

    /// Fetch history from this date (YYYY-MM-DD) instead of the lookback range.
    #[arg(long, global = true, env = "STOCKCAST_SINCE")]
    pub since: Option<IsoDate>,

    /// Keep only this many trailing observations before modeling.
    #[arg(long, global = true, env = "STOCKCAST_SERIES_WINDOW")]
    pub series_window: Option<usize>,
}

impl Cli {
    pub fn forecast_config(&self) -> ForecastConfig {
        ForecastConfig {
            lookback: self.model.lookback,
            since: self.model.since,
            series_window: self.model.series_window,
            fetch_timeout_ms: self.timeout_ms,
            ..ForecastConfig::default()
        }
        .with_holdout(self.model.holdout)
        .with_arima_order(self.model.arima_order)
        .with_models(self.model.models.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_forecast_with_defaults() {
        let cli = Cli::try_parse_from(["stockcast", "forecast", "AAPL", "--target-date", "2030-01-15"])
            .expect("valid arguments");

        let Command::Forecast(args) = &cli.command else {
            panic!("expected forecast command");
        };
        assert_eq!(args.ticker, "AAPL");
        assert_eq!(args.target_date, "2030-01-15");
        assert_eq!(cli.format, OutputFormat::Json);

        let config = cli.forecast_config();
        assert_eq!(config.holdout, HoldoutPolicy::Proportional(0.8));
        assert_eq!(config.model_settings.arima_order, ArimaOrder::default());
        assert_eq!(config.models, ModelKind::ALL.to_vec());
        assert_eq!(config.fetch_timeout_ms, 10_000);
        assert_eq!(config.since, None);
        assert_eq!(config.series_window, None);
    }

    #[test]
    fn parses_history_window_flags() {
        let cli = Cli::try_parse_from([
            "stockcast",
            "analysis",
            "MSFT",
            "--since",
            "2023-06-01",
            "--series-window",
            "250",
        ])
        .expect("valid arguments");

        let config = cli.forecast_config();
        assert_eq!(config.since, Some(IsoDate::parse("2023-06-01").expect("date")));
        assert_eq!(config.series_window, Some(250));
        assert!(Cli::try_parse_from(["stockcast", "analysis", "MSFT", "--since", "06/01/2023"]).is_err());
    }

    #[test]
    fn parses_model_flags_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "stockcast",
            "forecast",
            "NVDA",
            "--target-date",
            "2030-01-15",
            "--models",
            "arima,rf",
            "--holdout",
            "last:30",
            "--arima-order",
            "5,1,2",
            "--mock",
        ])
        .expect("valid arguments");

        let config = cli.forecast_config();
        assert!(cli.mock);
        assert_eq!(config.models, vec![ModelKind::Arima, ModelKind::RandomForest]);
        assert_eq!(config.holdout, HoldoutPolicy::Fixed(30));
        assert_eq!(
            config.model_settings.arima_order,
            ArimaOrder::new(5, 1, 2).expect("valid order")
        );
    }

    #[test]
    fn rejects_unknown_model_and_missing_target() {
        assert!(Cli::try_parse_from([
            "stockcast",
            "forecast",
            "AAPL",
            "--target-date",
            "2030-01-15",
            "--models",
            "lstm",
        ])
        .is_err());
        assert!(Cli::try_parse_from(["stockcast", "forecast", "AAPL"]).is_err());
    }
}
