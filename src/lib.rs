pub mod cli;
pub mod conditions;
pub mod config;
pub mod context;
pub mod error;
pub mod forecaster;
pub mod history;
pub mod prediction;
pub mod synthetic;

pub use conditions::Conditions;
pub use config::ForecastConfig;
pub use context::{ForecastContext, Snapshot, forecast};
pub use error::{ForecastErr, Result};
pub use forecaster::{FeatureVector, Forecaster, TargetVector};
pub use prediction::Prediction;
