use std::{num::NonZeroUsize, sync::Arc, thread};

use catch_forecast::{
    Conditions, ForecastConfig, ForecastContext, ForecastErr, Forecaster, Prediction,
    config::OptimizerConfig, synthetic::SyntheticDatasetGenerator,
};
use rand::{SeedableRng, rngs::StdRng};

fn seeded_config(seed: u64) -> ForecastConfig {
    ForecastConfig {
        seed: Some(seed),
        ..Default::default()
    }
}

fn morning_conditions() -> Conditions {
    Conditions {
        time_of_day: 12.,
        water_temp: 20.,
        tide_height: 2.,
        wind_speed: 10.,
        wave_height: 1.,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn bootstrapped_context_serves_the_reference_conditions() {
    let mut context = ForecastContext::bootstrap(seeded_config(7)).await.unwrap();

    let features = morning_conditions().normalize();
    let expected = [0.522, 0.571, 0.4, 0.167, 0.2];
    for (got, expected) in features.iter().zip(expected) {
        assert!((got - expected).abs() < 1e-3, "{got} != {expected}");
    }

    let prediction = context.handle(&morning_conditions()).unwrap();
    assert!(prediction.sustainability <= 100);

    let snapshot = context.snapshot();
    assert_eq!(snapshot.prediction, Some(prediction));
    assert_eq!(snapshot.trend.len(), 1);
    assert_eq!(snapshot.trend[0].catch_kg, prediction.catch_kg);
}

#[tokio::test]
async fn empty_dataset_never_yields_a_context() {
    let config = ForecastConfig {
        samples: 0,
        ..seeded_config(1)
    };

    let res = ForecastContext::bootstrap(config).await;
    assert!(matches!(res, Err(ForecastErr::InvalidArgument(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn diverged_training_never_yields_a_context() {
    let config = ForecastConfig {
        samples: 64,
        epochs: NonZeroUsize::new(5).unwrap(),
        optimizer: OptimizerConfig::GradientDescent { lr: 1e30 },
        ..seeded_config(4)
    };

    let res = ForecastContext::bootstrap(config).await;
    assert!(matches!(res, Err(ForecastErr::TrainingFailed(_))));
}

#[test]
fn same_seed_same_predictions() {
    let a = Forecaster::fit(&seeded_config(42)).unwrap();
    let b = Forecaster::fit(&seeded_config(42)).unwrap();

    let features = morning_conditions().normalize();
    let pa = a.predict(&features).unwrap();
    let pb = b.predict(&features).unwrap();

    assert!((pa[0] - pb[0]).abs() < 1e-5);
    assert!((pa[1] - pb[1]).abs() < 1e-5);
}

#[test]
fn concurrent_predictions_agree() {
    let forecaster = Arc::new(Forecaster::fit(&seeded_config(3)).unwrap());
    let features = morning_conditions().normalize();
    let expected = forecaster.predict(&features).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let forecaster = Arc::clone(&forecaster);
            thread::spawn(move || {
                (0..50)
                    .map(|_| forecaster.predict(&features).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        for target in handle.join().unwrap() {
            assert_eq!(target, expected);
        }
    }
}

#[test]
fn wrong_dimensionality_is_a_prediction_failure() {
    let forecaster = Forecaster::fit(&seeded_config(8)).unwrap();

    let res = forecaster.predict(&[0.1, 0.2, 0.3]);
    assert!(matches!(res, Err(ForecastErr::PredictionFailed(_))));
}

#[test]
fn generator_rejects_empty_datasets() {
    let mut generator = SyntheticDatasetGenerator::new(StdRng::seed_from_u64(0));

    assert!(matches!(
        generator.generate(0),
        Err(ForecastErr::InvalidArgument(_))
    ));
    assert_eq!(generator.generate(100).unwrap().len(), 100);
}

#[test]
fn out_of_range_outputs_are_clamped() {
    assert_eq!(
        Prediction::from_scaled(&[-1., 2.]),
        Prediction {
            catch_kg: 0,
            sustainability: 100
        }
    );
}

#[test]
fn trend_keeps_the_last_twenty_catches() {
    let forecaster = Arc::new(Forecaster::fit(&seeded_config(5)).unwrap());
    let history = catch_forecast::history::TrendHistory::new(NonZeroUsize::new(20).unwrap());
    let mut context = ForecastContext::new(forecaster, history);

    for hour in 0..21 {
        let conditions = Conditions {
            time_of_day: hour as f32,
            ..morning_conditions()
        };
        context.handle(&conditions).unwrap();
    }

    let trend = context.snapshot().trend;
    assert_eq!(trend.len(), 20);
    assert_eq!(trend[0].seq, 1);
    assert_eq!(trend[19].seq, 20);
}
