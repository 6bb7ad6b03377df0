use std::num::NonZeroUsize;

use log::{debug, info};
use rand::Rng;

use super::Trainer;
use crate::{
    MlErr, Result,
    arch::{Sequential, loss::LossFn},
    dataset::Dataset,
    optimization::Optimizer,
};

/// A model `Trainer`. Contains the relevant components needed for training a model,
/// including the model itself.
pub struct ModelTrainer<O, L, R>
where
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    model: Sequential,
    optimizer: O,
    loss_fn: L,

    epochs: NonZeroUsize,
    batch_size: NonZeroUsize,
    rng: R,
}

impl<O, L, R> ModelTrainer<O, L, R>
where
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    /// Returns a new `ModelTrainer`.
    ///
    /// # Arguments
    /// * `model` - The model that will be trained, with its parameters already initialized.
    /// * `optimizer` - The optimizer updating the parameters after each batch.
    /// * `loss_fn` - The loss function used to measure the difference between a model's output and the expected one.
    /// * `epochs` - The amount of full passes over the dataset.
    /// * `batch_size` - The amount of samples per parameter update.
    /// * `rng` - A random number generator, used to shuffle the dataset on each epoch.
    pub fn new(
        model: Sequential,
        optimizer: O,
        loss_fn: L,
        epochs: NonZeroUsize,
        batch_size: NonZeroUsize,
        rng: R,
    ) -> Self {
        Self {
            model,
            optimizer,
            loss_fn,
            epochs,
            batch_size,
            rng,
        }
    }

    /// Performs `epochs` epochs of training its model, using its optimizer, loss function and
    /// batch size over the given dataset.
    ///
    /// # Arguments
    /// * `dataset` - The dataset to train with, it's dropped once the training ends.
    ///
    /// # Returns
    /// The loss of each epoch, or an error if the dataset doesn't fit the model or the
    /// training diverged.
    pub fn train(&mut self, mut dataset: Dataset) -> Result<Vec<f32>> {
        self.check_dataset(&dataset)?;

        let epochs = self.epochs.get();
        let mut losses = Vec::with_capacity(epochs);

        for epoch in 0..epochs {
            dataset.shuffle(&mut self.rng);
            let batches = dataset.batches(self.batch_size);

            let loss = self
                .model
                .backprop(&mut self.optimizer, &self.loss_fn, batches)?;

            if !loss.is_finite() || !self.model.is_finite() {
                return Err(MlErr::Diverged { epoch, loss });
            }

            debug!(epoch = epoch, loss = loss; "epoch finished");
            losses.push(loss);
        }

        if let Some(loss) = losses.last() {
            info!(epochs = epochs, loss = *loss; "training finished");
        }

        Ok(losses)
    }

    pub fn model(&self) -> &Sequential {
        &self.model
    }

    pub fn into_model(self) -> Sequential {
        self.model
    }

    fn check_dataset(&self, dataset: &Dataset) -> Result<()> {
        let checks = [
            ("dataset inputs", dataset.x_size(), self.model.input_size()),
            ("dataset outputs", dataset.y_size(), self.model.output_size()),
        ];

        for (what, got, expected) in checks {
            let expected = expected.ok_or(MlErr::EmptyModel)?;

            if got != expected {
                return Err(MlErr::SizeMismatch {
                    what,
                    got,
                    expected,
                });
            }
        }

        Ok(())
    }
}

impl<O, L, R> Trainer for ModelTrainer<O, L, R>
where
    O: Optimizer + Send,
    L: LossFn + Send,
    R: Rng + Send,
{
    fn train(&mut self, dataset: Dataset) -> Result<Vec<f32>> {
        self.train(dataset)
    }

    fn model(&self) -> &Sequential {
        self.model()
    }

    fn into_model(self: Box<Self>) -> Sequential {
        (*self).into_model()
    }
}
