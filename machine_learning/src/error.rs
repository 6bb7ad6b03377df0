use std::{
    error::Error,
    fmt::{self, Display},
};

use ndarray::ShapeError;

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug, Clone, PartialEq)]
pub enum MlErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    InvalidShape(String),
    EmptyDataset,
    EmptyModel,
    InvalidDistribution(String),
    Diverged {
        epoch: usize,
        loss: f32,
    },
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => format!("There's a size mismatch in {what}, got {got} and expected {expected}"),
            MlErr::InvalidShape(reason) => format!("Invalid shape: {reason}"),
            MlErr::EmptyDataset => "The dataset has no samples".to_string(),
            MlErr::EmptyModel => "The model has no layers".to_string(),
            MlErr::InvalidDistribution(reason) => {
                format!("Failed to build the parameter distribution: {reason}")
            }
            MlErr::Diverged { epoch, loss } => {
                format!("Training diverged at epoch {epoch} with a loss of {loss}")
            }
        };

        write!(f, "{s}")
    }
}

impl Error for MlErr {}

impl From<ShapeError> for MlErr {
    fn from(value: ShapeError) -> Self {
        Self::InvalidShape(value.to_string())
    }
}
