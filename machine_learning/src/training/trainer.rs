use crate::{Result, arch::Sequential, dataset::Dataset};

/// Trains a model once over a dataset and hands the trained model over.
pub trait Trainer: Send {
    /// Trains the model, consuming the dataset.
    ///
    /// # Returns
    /// The loss of each epoch.
    fn train(&mut self, dataset: Dataset) -> Result<Vec<f32>>;

    /// Returns the model being trained.
    fn model(&self) -> &Sequential;

    /// Takes the model out of the trainer.
    fn into_model(self: Box<Self>) -> Sequential;
}
