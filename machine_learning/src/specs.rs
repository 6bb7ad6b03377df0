//! Declarative descriptions of a training, resolved into concrete components by the
//! `TrainerBuilder`.

use std::num::NonZeroUsize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActFnSpec {
    Relu,
}

/// How the weights of a layer are initialized, biases always start at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamGenSpec {
    Const { value: f32 },
    XavierUniform,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerSpec {
    Dense {
        dim: (usize, usize),
        act_fn: Option<ActFnSpec>,
        init: ParamGenSpec,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelSpec {
    Sequential { layers: Vec<LayerSpec> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptimizerSpec {
    Adam {
        learning_rate: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    },
    GradientDescent {
        learning_rate: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LossFnSpec {
    Mse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainerSpec {
    pub model: ModelSpec,
    pub optimizer: OptimizerSpec,
    pub loss: LossFnSpec,
    pub epochs: NonZeroUsize,
    pub batch_size: NonZeroUsize,
    pub seed: Option<u64>,
}
