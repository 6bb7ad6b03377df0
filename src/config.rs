use std::{env, fs, num::NonZeroUsize, path::Path};

use machine_learning::specs::{
    ActFnSpec, LayerSpec, LossFnSpec, ModelSpec, OptimizerSpec, ParamGenSpec, TrainerSpec,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ForecastErr, Result},
    forecaster::{FEATURES, TARGETS},
};

/// Environment variable holding the path of a JSON configuration file.
pub const CONFIG_PATH_VAR: &str = "FORECAST_CONFIG";
/// Environment variable overriding the configured seed.
pub const SEED_VAR: &str = "FORECAST_SEED";

const DEFAULT_SAMPLES: usize = 512;
const DEFAULT_EPOCHS: NonZeroUsize = NonZeroUsize::new(30).unwrap();
const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(32).unwrap();
const DEFAULT_HISTORY_CAPACITY: NonZeroUsize = NonZeroUsize::new(20).unwrap();

const HIDDEN_LAYERS: [usize; 2] = [16, 8];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizerConfig {
    Adam {
        #[serde(default = "default_lr")]
        lr: f32,
        #[serde(default = "default_b1")]
        b1: f32,
        #[serde(default = "default_b2")]
        b2: f32,
        #[serde(default = "default_eps")]
        eps: f32,
    },
    GradientDescent {
        #[serde(default = "default_lr")]
        lr: f32,
    },
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam {
            lr: default_lr(),
            b1: default_b1(),
            b2: default_b2(),
            eps: default_eps(),
        }
    }
}

fn default_lr() -> f32 {
    0.01
}

fn default_b1() -> f32 {
    0.9
}

fn default_b2() -> f32 {
    0.999
}

fn default_eps() -> f32 {
    1e-7
}

/// Everything needed to train a forecaster and serve predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    pub samples: usize,
    pub epochs: NonZeroUsize,
    pub batch_size: NonZeroUsize,
    pub optimizer: OptimizerConfig,
    pub history_capacity: NonZeroUsize,
    pub seed: Option<u64>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            epochs: DEFAULT_EPOCHS,
            batch_size: DEFAULT_BATCH_SIZE,
            optimizer: OptimizerConfig::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            seed: None,
        }
    }
}

impl ForecastConfig {
    /// Loads a `ForecastConfig` from a JSON file, missing fields take their default value.
    ///
    /// # Errors
    /// `ForecastErr::Config` if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ForecastErr::Config(format!("cannot read '{}': {e}", path.display())))?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| ForecastErr::Config(format!("invalid JSON: {e}")))
    }

    /// Loads the config file named by `FORECAST_CONFIG`, or the defaults if it's unset, and then
    /// applies the `FORECAST_SEED` override.
    pub fn from_env() -> Result<Self> {
        let mut config = match env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(seed) = env::var(SEED_VAR) {
            let seed = seed
                .trim()
                .parse()
                .map_err(|e| ForecastErr::Config(format!("{SEED_VAR} must be a u64: {e}")))?;
            config.seed = Some(seed);
        }

        Ok(config)
    }

    /// Builds the trainer specification of the forecasting network.
    ///
    /// # Arguments
    /// * `seed` - Seeds the parameter initialization and the shuffling of the dataset.
    pub fn trainer_spec(&self, seed: Option<u64>) -> TrainerSpec {
        let dims = [FEATURES, HIDDEN_LAYERS[0], HIDDEN_LAYERS[1], TARGETS];
        let last = dims.len() - 2;

        let layers = dims
            .windows(2)
            .enumerate()
            .map(|(i, dim)| LayerSpec::Dense {
                dim: (dim[0], dim[1]),
                act_fn: (i < last).then_some(ActFnSpec::Relu),
                init: ParamGenSpec::XavierUniform,
            })
            .collect();

        let optimizer = match self.optimizer {
            OptimizerConfig::Adam { lr, b1, b2, eps } => OptimizerSpec::Adam {
                learning_rate: lr,
                beta1: b1,
                beta2: b2,
                epsilon: eps,
            },
            OptimizerConfig::GradientDescent { lr } => {
                OptimizerSpec::GradientDescent { learning_rate: lr }
            }
        };

        TrainerSpec {
            model: ModelSpec::Sequential { layers },
            optimizer,
            loss: LossFnSpec::Mse,
            epochs: self.epochs,
            batch_size: self.batch_size,
            seed,
        }
    }
}
