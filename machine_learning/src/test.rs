#![cfg(test)]

use std::num::NonZeroUsize;

use ndarray::Array2;
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    arch::{
        Sequential,
        layers::Dense,
        loss::{LossFn, Mse},
    },
    dataset::Dataset,
    initialization::ConstParamGen,
    optimization::{Adam, GradientDescent},
    specs::{
        ActFnSpec, LayerSpec, LossFnSpec, ModelSpec, OptimizerSpec, ParamGenSpec, TrainerSpec,
    },
    training::{ModelTrainer, TrainerBuilder},
};

// y = 2x + 1 over x in [0, 1)
fn line_dataset() -> Dataset {
    let data = (0..8)
        .flat_map(|i| {
            let x = i as f32 / 8.;
            [x, 2. * x + 1.]
        })
        .collect();

    Dataset::new(data, 1, 1).unwrap()
}

fn linear_model() -> Sequential {
    let mut model = Sequential::new([Dense::new((1, 1), None)]);
    model.init_params(&mut ConstParamGen::new(0., 2)).unwrap();
    model
}

#[test]
fn test_ml_linear_regression_convergence() {
    let mut trainer = ModelTrainer::new(
        linear_model(),
        GradientDescent::new(0.1),
        Mse,
        NonZeroUsize::new(2000).unwrap(),
        NonZeroUsize::new(4).unwrap(),
        StdRng::seed_from_u64(0),
    );

    trainer.train(line_dataset()).unwrap();

    let params = trainer.model().params();
    assert!((params[0] - 2.).abs() < 0.05, "weight: {}", params[0]);
    assert!((params[1] - 1.).abs() < 0.05, "bias: {}", params[1]);
}

#[test]
fn test_ml_adam_linear_regression_convergence() {
    let mut trainer = ModelTrainer::new(
        linear_model(),
        Adam::new(2, 0.05, 0.9, 0.999, 1e-7),
        Mse,
        NonZeroUsize::new(300).unwrap(),
        NonZeroUsize::new(4).unwrap(),
        StdRng::seed_from_u64(0),
    );

    let losses = trainer.train(line_dataset()).unwrap();

    let first = losses[0];
    let last = losses[losses.len() - 1];
    assert!(last < first / 10., "first: {first}, last: {last}");
}

#[test]
fn test_ml_built_network_fits_a_nonlinear_function() {
    let spec = TrainerSpec {
        model: ModelSpec::Sequential {
            layers: vec![
                LayerSpec::Dense {
                    dim: (1, 8),
                    act_fn: Some(ActFnSpec::Relu),
                    init: ParamGenSpec::XavierUniform,
                },
                LayerSpec::Dense {
                    dim: (8, 1),
                    act_fn: None,
                    init: ParamGenSpec::XavierUniform,
                },
            ],
        },
        optimizer: OptimizerSpec::Adam {
            learning_rate: 0.01,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
        },
        loss: LossFnSpec::Mse,
        epochs: NonZeroUsize::new(200).unwrap(),
        batch_size: NonZeroUsize::new(8).unwrap(),
        seed: Some(11),
    };

    // y = |x - 0.5| over x in [0, 1)
    let data: Vec<f32> = (0..32)
        .flat_map(|i| {
            let x = i as f32 / 32.;
            [x, (x - 0.5).abs()]
        })
        .collect();
    let dataset = Dataset::new(data.clone(), 1, 1).unwrap();

    let mut trainer = TrainerBuilder::new().build(&spec).unwrap();
    let losses = trainer.train(dataset).unwrap();
    let model = trainer.into_model();

    let rows = Array2::from_shape_vec((32, 2), data).unwrap();
    let x = rows.column(0).to_owned().insert_axis(ndarray::Axis(1));
    let y = rows.column(1).to_owned().insert_axis(ndarray::Axis(1));
    let y_pred = model.predict(x.view()).unwrap();

    let err = Mse.loss(y_pred.view(), y.view());
    assert_eq!(losses.len(), 200);
    assert!(err < losses[0], "err: {err}, first epoch: {}", losses[0]);
}
