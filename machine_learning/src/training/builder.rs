use std::{cell::RefCell, rc::Rc};

use rand::{SeedableRng, rngs::StdRng};

use super::{ModelTrainer, Trainer};
use crate::{
    MlErr, Result,
    arch::{
        Sequential,
        activations::ActFn,
        layers::Dense,
        loss::{LossFn, Mse},
    },
    initialization::{ChainedParamGen, ConstParamGen, ParamGen, RandParamGen},
    optimization::{Adam, GradientDescent, Optimizer},
    specs::{
        ActFnSpec, LayerSpec, LossFnSpec, ModelSpec, OptimizerSpec, ParamGenSpec, TrainerSpec,
    },
};

/// Builds `Trainer`s given a specification.
#[derive(Default)]
pub struct TrainerBuilder;

impl TrainerBuilder {
    /// Creates a new `TrainerBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new `Trainer` following a spec.
    ///
    /// # Arguments
    /// * `spec` - The specification for the trainer.
    ///
    /// # Returns
    /// The trainer, holding a model with freshly initialized parameters, or an error if the
    /// spec describes an invalid model.
    pub fn build(&self, spec: &TrainerSpec) -> Result<Box<dyn Trainer>> {
        let mut rng = self.generate_rng(spec.seed);
        let model = self.resolve_model(&spec.model, &mut rng)?;
        self.resolve_optimizer(spec, model, rng)
    }

    fn resolve_model(&self, spec: &ModelSpec, rng: &mut StdRng) -> Result<Sequential> {
        let ModelSpec::Sequential { layers } = spec;
        self.validate_layers(layers)?;

        let init_rng = Rc::new(RefCell::new(StdRng::from_rng(rng)));
        let mut param_gens: Vec<Box<dyn ParamGen>> = Vec::with_capacity(layers.len() * 2);

        for layer in layers {
            let LayerSpec::Dense { dim, init, .. } = *layer;
            param_gens.push(self.resolve_param_gen(init, dim, Rc::clone(&init_rng))?);
            param_gens.push(Box::new(ConstParamGen::new(0., dim.1)));
        }

        let mut model = Sequential::new(layers.iter().map(|ls| self.resolve_layer(*ls)));
        model.init_params(&mut ChainedParamGen::new(param_gens))?;
        Ok(model)
    }

    fn validate_layers(&self, layers: &[LayerSpec]) -> Result<()> {
        if layers.is_empty() {
            return Err(MlErr::EmptyModel);
        }

        for pair in layers.windows(2) {
            let [LayerSpec::Dense { dim: prev, .. }, LayerSpec::Dense { dim: next, .. }] = pair
            else {
                continue;
            };

            if prev.1 != next.0 {
                return Err(MlErr::SizeMismatch {
                    what: "layer inputs",
                    got: next.0,
                    expected: prev.1,
                });
            }
        }

        Ok(())
    }

    fn resolve_layer(&self, spec: LayerSpec) -> Dense {
        match spec {
            LayerSpec::Dense { dim, act_fn, .. } => {
                Dense::new(dim, act_fn.map(Self::resolve_act_fn))
            }
        }
    }

    fn resolve_act_fn(spec: ActFnSpec) -> ActFn {
        match spec {
            ActFnSpec::Relu => ActFn::relu(),
        }
    }

    fn resolve_param_gen(
        &self,
        spec: ParamGenSpec,
        (fan_in, fan_out): (usize, usize),
        rng: Rc<RefCell<StdRng>>,
    ) -> Result<Box<dyn ParamGen>> {
        let limit = fan_in * fan_out;

        let param_gen: Box<dyn ParamGen> = match spec {
            ParamGenSpec::Const { value } => Box::new(ConstParamGen::new(value, limit)),
            ParamGenSpec::XavierUniform => {
                Box::new(RandParamGen::xavier_uniform(rng, limit, fan_in, fan_out)?)
            }
        };

        Ok(param_gen)
    }

    fn resolve_optimizer(
        &self,
        spec: &TrainerSpec,
        model: Sequential,
        rng: StdRng,
    ) -> Result<Box<dyn Trainer>> {
        match spec.optimizer {
            OptimizerSpec::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => {
                let optimizer = Adam::new(model.size(), learning_rate, beta1, beta2, epsilon);
                self.resolve_loss(spec, model, optimizer, rng)
            }
            OptimizerSpec::GradientDescent { learning_rate } => {
                let optimizer = GradientDescent::new(learning_rate);
                self.resolve_loss(spec, model, optimizer, rng)
            }
        }
    }

    fn resolve_loss<O>(
        &self,
        spec: &TrainerSpec,
        model: Sequential,
        optimizer: O,
        rng: StdRng,
    ) -> Result<Box<dyn Trainer>>
    where
        O: Optimizer + Send + 'static,
    {
        match spec.loss {
            LossFnSpec::Mse => self.terminate_build(spec, model, optimizer, Mse::new(), rng),
        }
    }

    fn terminate_build<O, L>(
        &self,
        spec: &TrainerSpec,
        model: Sequential,
        optimizer: O,
        loss_fn: L,
        rng: StdRng,
    ) -> Result<Box<dyn Trainer>>
    where
        O: Optimizer + Send + 'static,
        L: LossFn + Send + 'static,
    {
        let trainer = ModelTrainer::new(
            model,
            optimizer,
            loss_fn,
            spec.epochs,
            spec.batch_size,
            rng,
        );

        Ok(Box::new(trainer))
    }

    fn generate_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
