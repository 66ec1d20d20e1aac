use stockcast_core::ForecastService;

use crate::cli::ForecastArgs;
use crate::error::CliError;

use super::CommandOutput;

pub async fn run(args: &ForecastArgs, service: &ForecastService) -> Result<CommandOutput, CliError> {
    let report = service.forecast(&args.ticker, &args.target_date).await?;
    Ok(CommandOutput::Forecast(report))
}
