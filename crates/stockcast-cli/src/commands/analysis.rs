use stockcast_core::ForecastService;

use crate::cli::AnalysisArgs;
use crate::error::CliError;

use super::CommandOutput;

pub async fn run(args: &AnalysisArgs, service: &ForecastService) -> Result<CommandOutput, CliError> {
    let report = service.analysis(&args.ticker).await?;
    Ok(CommandOutput::Analysis(report))
}
