use std::sync::Arc;

use log::{debug, info};
use serde::Serialize;
use tokio::task;

use crate::{
    conditions::Conditions,
    config::ForecastConfig,
    error::{ForecastErr, Result},
    forecaster::Forecaster,
    history::{TrendHistory, TrendPoint},
    prediction::Prediction,
};

/// Normalizes `conditions`, runs them through the forecaster and maps the output back to a
/// displayable prediction.
pub fn forecast(forecaster: &Forecaster, conditions: &Conditions) -> Result<Prediction> {
    let target = forecaster.predict(&conditions.normalize())?;
    Ok(Prediction::from_scaled(&target))
}

/// What the user is currently shown: the last prediction and the recent catch trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub prediction: Option<Prediction>,
    pub trend: Vec<TrendPoint>,
}

/// The state of a forecasting session.
///
/// Only exists once its forecaster is trained, so every request it handles is served by a
/// ready model.
pub struct ForecastContext {
    forecaster: Arc<Forecaster>,
    history: TrendHistory,
    last: Option<Prediction>,
}

impl ForecastContext {
    /// Trains a forecaster on a blocking task and wraps it in a fresh context.
    ///
    /// # Errors
    /// Any error from generating the dataset or training, or `ForecastErr::TrainingFailed` if the
    /// training task panicked.
    pub async fn bootstrap(config: ForecastConfig) -> Result<Self> {
        let history = TrendHistory::new(config.history_capacity);

        let forecaster = task::spawn_blocking(move || Forecaster::fit(&config))
            .await
            .map_err(|e| ForecastErr::TrainingFailed(e.to_string()))??;

        info!("forecaster ready");
        Ok(Self::new(Arc::new(forecaster), history))
    }

    /// Creates a context around an already trained forecaster.
    pub fn new(forecaster: Arc<Forecaster>, history: TrendHistory) -> Self {
        Self {
            forecaster,
            history,
            last: None,
        }
    }

    /// Forecasts `conditions`, records the catch in the trend and displays the prediction.
    pub fn handle(&mut self, conditions: &Conditions) -> Result<Prediction> {
        let prediction = forecast(&self.forecaster, conditions)?;

        debug!(
            catch_kg = prediction.catch_kg,
            sustainability = prediction.sustainability;
            "prediction made"
        );

        self.history.push(prediction.catch_kg);
        self.last = Some(prediction);
        Ok(prediction)
    }

    /// Clears the displayed prediction, the trend is kept.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            prediction: self.last,
            trend: self.history.points().copied().collect(),
        }
    }

    pub fn history(&self) -> &TrendHistory {
        &self.history
    }

    /// Returns a handle to the forecaster for callers predicting from other threads.
    pub fn forecaster(&self) -> Arc<Forecaster> {
        Arc::clone(&self.forecaster)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;

    fn context(capacity: usize) -> ForecastContext {
        let config = ForecastConfig {
            samples: 128,
            seed: Some(21),
            ..Default::default()
        };

        let forecaster = Forecaster::fit(&config).unwrap();
        let history = TrendHistory::new(NonZeroUsize::new(capacity).unwrap());
        ForecastContext::new(Arc::new(forecaster), history)
    }

    fn reference_conditions() -> Conditions {
        Conditions {
            time_of_day: 12.,
            water_temp: 20.,
            tide_height: 2.,
            wind_speed: 10.,
            wave_height: 1.,
        }
    }

    #[test]
    fn handle_records_the_prediction() {
        let mut context = context(20);
        assert_eq!(context.snapshot().prediction, None);

        let prediction = context.handle(&reference_conditions()).unwrap();
        let snapshot = context.snapshot();

        assert!(prediction.sustainability <= 100);
        assert_eq!(snapshot.prediction, Some(prediction));
        assert_eq!(context.history().values(), [prediction.catch_kg]);
    }

    #[test]
    fn reset_keeps_the_trend() {
        let mut context = context(20);
        context.handle(&reference_conditions()).unwrap();
        context.reset();

        let snapshot = context.snapshot();
        assert_eq!(snapshot.prediction, None);
        assert_eq!(snapshot.trend.len(), 1);
    }

    #[test]
    fn trend_is_bounded() {
        let mut context = context(3);

        for hour in 0..5 {
            let conditions = Conditions {
                time_of_day: hour as f32,
                ..reference_conditions()
            };
            context.handle(&conditions).unwrap();
        }

        let seqs: Vec<_> = context.snapshot().trend.iter().map(|p| p.seq).collect();
        assert_eq!(seqs, [2, 3, 4]);
    }

    #[test]
    fn forecast_is_pure() {
        let context = context(20);
        let forecaster = context.forecaster();

        let a = forecast(&forecaster, &reference_conditions()).unwrap();
        let b = forecast(&forecaster, &reference_conditions()).unwrap();

        assert_eq!(a, b);
        assert!(context.history().is_empty());
    }
}
