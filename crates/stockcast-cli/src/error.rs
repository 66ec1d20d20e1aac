use stockcast_core::{ForecastError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Forecast(error) if error.is_client_error() => 2,
            Self::Forecast(_) => 3,
            Self::Serialization(_) | Self::Io(_) => 4,
        }
    }
}
