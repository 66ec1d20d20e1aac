mod analysis;
mod forecast;

use std::sync::Arc;

use stockcast_core::{
    AnalysisReport, ForecastReport, ForecastService, HttpAuth, HttpClient, NoopHttpClient,
    ReqwestHttpClient,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Result of one command, rendered by [`crate::output`].
#[derive(Debug)]
pub enum CommandOutput {
    Forecast(ForecastReport),
    Analysis(AnalysisReport),
}

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    let service = build_service(cli)?;
    tracing::debug!(source = service.source_id(), mock = cli.mock, "service ready");

    match &cli.command {
        Command::Forecast(args) => forecast::run(args, &service).await,
        Command::Analysis(args) => analysis::run(args, &service).await,
    }
}

fn build_service(cli: &Cli) -> Result<ForecastService, CliError> {
    let http_client: Arc<dyn HttpClient> = if cli.mock {
        Arc::new(NoopHttpClient)
    } else {
        Arc::new(ReqwestHttpClient::new())
    };
    Ok(ForecastService::with_yahoo(
        cli.forecast_config(),
        http_client,
        HttpAuth::from_env(),
    )?)
}
