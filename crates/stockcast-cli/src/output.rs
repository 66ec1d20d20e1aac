//! Renders command results to a writer.

use std::io::Write;

use serde::Serialize;
use stockcast_core::{AnalysisReport, ForecastReport};

use crate::cli::OutputFormat;
use crate::commands::CommandOutput;
use crate::error::CliError;

pub fn render(
    output: &CommandOutput,
    format: OutputFormat,
    pretty: bool,
    writer: &mut impl Write,
) -> Result<(), CliError> {
    match (format, output) {
        (OutputFormat::Json, CommandOutput::Forecast(report)) => write_json(report, pretty, writer),
        (OutputFormat::Json, CommandOutput::Analysis(report)) => write_json(report, pretty, writer),
        (OutputFormat::Table, CommandOutput::Forecast(report)) => forecast_table(report, writer),
        (OutputFormat::Table, CommandOutput::Analysis(report)) => analysis_table(report, writer),
    }
}

fn write_json<T: Serialize>(value: &T, pretty: bool, writer: &mut impl Write) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, value)?;
    } else {
        serde_json::to_writer(&mut *writer, value)?;
    }
    writeln!(writer)?;
    Ok(())
}

fn forecast_table(report: &ForecastReport, writer: &mut impl Write) -> Result<(), CliError> {
    writeln!(
        writer,
        "{} ({}) target {} horizon {} trading days",
        report.ticker, report.currency, report.target_date, report.horizon
    )?;
    writeln!(writer, "{:<8} {:>12} {:>10} {:>8}", "MODEL", "PREDICTION", "RMSE", "MAPE")?;
    for (model, prediction) in &report.predictions {
        let (rmse, mape) = match report.metrics.get(model) {
            Some(metrics) => (
                format!("{:.4}", metrics.rmse),
                metrics.mape.map_or_else(|| String::from("-"), |mape| format!("{mape:.2}%")),
            ),
            None => (String::from("-"), String::from("-")),
        };
        writeln!(writer, "{:<8} {:>12.4} {:>10} {:>8}", model.as_str(), prediction, rmse, mape)?;
    }
    Ok(())
}

fn analysis_table(report: &AnalysisReport, writer: &mut impl Write) -> Result<(), CliError> {
    writeln!(
        writer,
        "{:<10} {:>10} {:>10} {:>10} {:>7} {:>8} {:>8} {:>10} {:>10}",
        "DATE", "CLOSE", "SMA20", "EMA20", "RSI", "MACD", "SIGNAL", "BB_UPPER", "BB_LOWER"
    )?;
    for row in &report.data {
        writeln!(
            writer,
            "{:<10} {:>10.2} {:>10.2} {:>10.2} {:>7.2} {:>8.3} {:>8.3} {:>10.2} {:>10.2}",
            row.date,
            row.close,
            row.sma_20,
            row.ema_20,
            row.rsi,
            row.macd,
            row.signal,
            row.bb_upper,
            row.bb_lower
        )?;
    }
    Ok(())
}
