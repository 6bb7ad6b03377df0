use std::{error::Error, fmt};

/// The forecast module's result type.
pub type Result<T> = std::result::Result<T, ForecastErr>;

/// All errors that can occur while building or querying a forecast.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastErr {
    /// A dataset size, a vector dimensionality or a configuration value is out of its domain.
    InvalidArgument(String),
    /// Training diverged or couldn't run, the model must not be used.
    TrainingFailed(String),
    /// The model couldn't produce a prediction for the given input.
    PredictionFailed(String),
    /// The configuration couldn't be read or parsed.
    Config(String),
}

impl fmt::Display for ForecastErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::TrainingFailed(msg) => write!(f, "training failed: {msg}"),
            Self::PredictionFailed(msg) => write!(f, "prediction failed: {msg}"),
            Self::Config(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for ForecastErr {}
