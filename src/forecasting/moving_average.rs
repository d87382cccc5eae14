//! Seven-day moving average baseline.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{ForecastModel, ModelError, ModelFamily, flat_forecast, method};
use crate::models::{DailySeries, Prediction};

/// Trailing window length.
const WINDOW: usize = 7;

/// Baseline: every horizon day forecasts the mean of the last seven
/// observations. Cheap, explainable, and the yardstick the quality layer
/// compares everything else against.
#[derive(Debug, Default)]
pub struct MovingAverageModel {
    level: Option<f64>,
}

impl MovingAverageModel {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ForecastModel for MovingAverageModel {
    fn id(&self) -> &'static str {
        method::MA7
    }

    fn family(&self) -> ModelFamily {
        ModelFamily::StatisticalSimple
    }

    fn fit(&mut self, history: &DailySeries) -> Result<(), ModelError> {
        if history.len() < WINDOW {
            return Err(ModelError::InsufficientData {
                required: WINDOW,
                actual: history.len(),
            });
        }
        let tail = &history.values()[history.len() - WINDOW..];
        self.level = Some(tail.iter().sum::<f64>() / WINDOW as f64);
        Ok(())
    }

    async fn predict(
        &self,
        horizon_days: usize,
        training_end: NaiveDate,
    ) -> Result<Vec<Prediction>, ModelError> {
        let level = self.level.ok_or(ModelError::NotFitted)?;
        Ok(flat_forecast(level, horizon_days, training_end))
    }
}
