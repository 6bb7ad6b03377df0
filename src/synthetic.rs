use log::info;
use machine_learning::dataset::Dataset;
use rand::Rng;

use crate::{
    error::{ForecastErr, Result},
    forecaster::{FEATURES, FeatureVector, TARGETS, TargetVector},
    prediction::{CATCH_SCALE, SUSTAINABILITY_SCALE},
};

/// Generates heuristically labeled training data for the forecaster.
///
/// Every feature is drawn uniformly from `[0, 1)` in `FeatureVector` order, the labels follow a
/// fixed heuristic of those features scaled down to roughly `[0, 1]`.
pub struct SyntheticDatasetGenerator<R: Rng> {
    rng: R,
}

impl<R: Rng> SyntheticDatasetGenerator<R> {
    /// Creates a new `SyntheticDatasetGenerator`.
    ///
    /// # Arguments
    /// * `rng` - The source of every drawn feature, a seeded one makes the output reproducible.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Generates `count` labeled samples.
    ///
    /// # Arguments
    /// * `count` - The amount of rows of the dataset.
    ///
    /// # Returns
    /// A dataset of `FEATURES` inputs and `TARGETS` outputs per row, or an error if `count` is zero.
    pub fn generate(&mut self, count: usize) -> Result<Dataset> {
        if count == 0 {
            return Err(ForecastErr::InvalidArgument(
                "the synthetic dataset needs at least one sample".into(),
            ));
        }

        let len = count
            .checked_mul(FEATURES + TARGETS)
            .ok_or_else(|| too_many_samples(count))?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| too_many_samples(count))?;

        for _ in 0..count {
            let features = self.draw_features();
            data.extend_from_slice(&features);
            data.extend_from_slice(&scaled_targets(&features));
        }

        let dataset = Dataset::new(data, FEATURES, TARGETS)
            .map_err(|e| ForecastErr::InvalidArgument(e.to_string()))?;

        info!(samples = count; "synthetic dataset generated");
        Ok(dataset)
    }

    fn draw_features(&mut self) -> FeatureVector {
        let mut features = [0.; FEATURES];
        for feature in features.iter_mut() {
            *feature = self.rng.random();
        }
        features
    }
}

fn too_many_samples(count: usize) -> ForecastErr {
    ForecastErr::InvalidArgument(format!("{count} samples don't fit in memory"))
}

/// The expected catch, in kg, for some normalized conditions.
pub fn catch_kg(features: &FeatureVector) -> f32 {
    let [time, water, tide, wind, wave] = *features;

    80. * water + 20. * (1. - 2. * (0.5 - wind).abs()) + 10. * (1. - wave) + 10. * tide + 5. * time
}

/// The expected sustainability score, in `[0, 100]`, for some normalized conditions.
pub fn sustainability(features: &FeatureVector) -> f32 {
    let [_, _, tide, wind, wave] = *features;

    100. * (0.6 * (1. - wind) + 0.3 * (1. - wave) + 0.1 * tide)
}

/// The training label of some normalized conditions.
pub fn scaled_targets(features: &FeatureVector) -> TargetVector {
    [
        catch_kg(features) / CATCH_SCALE,
        sustainability(features) / SUSTAINABILITY_SCALE,
    ]
}
