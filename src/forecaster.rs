use log::info;
use machine_learning::{
    arch::Sequential,
    dataset::Dataset,
    specs::{LayerSpec, ModelSpec, TrainerSpec},
    training::TrainerBuilder,
};
use ndarray::{Array2, ArrayView2};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    config::ForecastConfig,
    error::{ForecastErr, Result},
    synthetic::SyntheticDatasetGenerator,
};

/// Amount of model inputs.
pub const FEATURES: usize = 5;
/// Amount of model outputs.
pub const TARGETS: usize = 2;

/// Normalized conditions: time of day, water temperature, tide height, wind speed, wave height.
pub type FeatureVector = [f32; FEATURES];
/// Scaled forecast: catch, sustainability.
pub type TargetVector = [f32; TARGETS];

/// A trained regression model mapping `FeatureVector`s to `TargetVector`s.
///
/// It can only be obtained through training, and is read-only afterwards so it can be shared
/// between threads.
#[derive(Debug, Clone)]
pub struct Forecaster {
    model: Sequential,
    losses: Vec<f32>,
}

impl Forecaster {
    /// Generates a synthetic dataset and trains a forecaster on it.
    ///
    /// A single RNG, seeded from the config when possible, drives the dataset, the parameter
    /// initialization and the shuffling.
    pub fn fit(config: &ForecastConfig) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let trainer_seed = rng.random();
        let dataset = SyntheticDatasetGenerator::new(&mut rng).generate(config.samples)?;

        Self::train(&config.trainer_spec(Some(trainer_seed)), dataset)
    }

    /// Trains a forecaster following `spec` over `dataset`.
    ///
    /// # Errors
    /// `ForecastErr::InvalidArgument` if the spec doesn't describe a valid network and
    /// `ForecastErr::TrainingFailed` if the dataset doesn't fit it or the training diverged.
    pub fn train(spec: &TrainerSpec, dataset: Dataset) -> Result<Self> {
        check_shape(spec)?;

        let mut trainer = TrainerBuilder::new()
            .build(spec)
            .map_err(|e| ForecastErr::InvalidArgument(e.to_string()))?;

        let samples = dataset.len();
        let losses = trainer
            .train(dataset)
            .map_err(|e| ForecastErr::TrainingFailed(e.to_string()))?;

        let model = trainer.into_model();

        if let Some(loss) = losses.last() {
            info!(samples = samples, loss = *loss; "forecaster trained");
        }

        Ok(Self { model, losses })
    }

    /// Predicts the scaled forecast of some normalized conditions.
    ///
    /// # Errors
    /// `ForecastErr::PredictionFailed` if `features` doesn't hold exactly `FEATURES` values.
    pub fn predict(&self, features: &[f32]) -> Result<TargetVector> {
        if features.len() != FEATURES {
            return Err(ForecastErr::PredictionFailed(format!(
                "expected {FEATURES} features, got {}",
                features.len()
            )));
        }

        let x = ArrayView2::from_shape((1, FEATURES), features)
            .map_err(|e| ForecastErr::PredictionFailed(e.to_string()))?;

        let targets = self.infer(x)?;
        let [target] = &targets[..] else {
            return Err(ForecastErr::PredictionFailed(format!(
                "expected a single output row, got {}",
                targets.len()
            )));
        };

        Ok(*target)
    }

    /// Predicts the scaled forecast of many normalized conditions at once.
    pub fn predict_batch(&self, features: &[FeatureVector]) -> Result<Vec<TargetVector>> {
        if features.is_empty() {
            return Ok(Vec::new());
        }

        let x = Array2::from_shape_vec((features.len(), FEATURES), features.concat())
            .map_err(|e| ForecastErr::PredictionFailed(e.to_string()))?;

        self.infer(x.view())
    }

    /// The average loss of every training epoch.
    pub fn losses(&self) -> &[f32] {
        &self.losses
    }

    fn infer(&self, x: ArrayView2<f32>) -> Result<Vec<TargetVector>> {
        let y = self
            .model
            .predict(x)
            .map_err(|e| ForecastErr::PredictionFailed(e.to_string()))?;

        Ok(y.rows().into_iter().map(|row| [row[0], row[1]]).collect())
    }
}

fn check_shape(spec: &TrainerSpec) -> Result<()> {
    let ModelSpec::Sequential { layers } = &spec.model;

    let inputs = layers.first().map(|LayerSpec::Dense { dim, .. }| dim.0);
    let outputs = layers.last().map(|LayerSpec::Dense { dim, .. }| dim.1);

    if inputs != Some(FEATURES) || outputs != Some(TARGETS) {
        return Err(ForecastErr::InvalidArgument(format!(
            "a forecaster maps {FEATURES} features to {TARGETS} targets, got {inputs:?} to {outputs:?}"
        )));
    }

    Ok(())
}
