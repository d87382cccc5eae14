//! Min/Max replenishment rule for low-value erratic items.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{ForecastModel, ModelError, ModelFamily, flat_forecast, method};
use crate::models::{DailySeries, Prediction};

/// Rule-based fallback for C-Z items: the daily level is the mean of
/// non-zero demand clamped into a configured band. Not a statistical
/// forecast, just a cheap floor/ceiling heuristic. A history with no demand
/// at all yields a level of zero.
#[derive(Debug)]
pub struct MinMaxModel {
    floor: f64,
    ceiling: f64,
    level: Option<f64>,
}

impl MinMaxModel {
    pub fn new(floor: f64, ceiling: f64) -> Self {
        Self {
            floor,
            ceiling,
            level: None,
        }
    }
}

#[async_trait]
impl ForecastModel for MinMaxModel {
    fn id(&self) -> &'static str {
        method::MIN_MAX
    }

    fn family(&self) -> ModelFamily {
        ModelFamily::RuleBased
    }

    fn fit(&mut self, history: &DailySeries) -> Result<(), ModelError> {
        let non_zero: Vec<f64> = history
            .values()
            .iter()
            .copied()
            .filter(|v| *v > 0.0)
            .collect();
        self.level = Some(if non_zero.is_empty() {
            0.0
        } else {
            let mean = non_zero.iter().sum::<f64>() / non_zero.len() as f64;
            mean.clamp(self.floor, self.ceiling)
        });
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

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: Vec<f64>) -> DailySeries {
        DailySeries::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), values)
    }

    #[tokio::test]
    async fn test_level_is_clamped_non_zero_mean() {
        let mut model = MinMaxModel::new(1.0, 5.0);
        // Non-zero mean is 8, clamped to the ceiling.
        model.fit(&series(vec![0.0, 8.0, 0.0, 8.0])).unwrap();
        let predictions = model
            .predict(3, NaiveDate::from_ymd_opt(2025, 1, 4).unwrap())
            .await
            .unwrap();
        assert!(predictions.iter().all(|p| p.point == 5.0));
    }

    #[tokio::test]
    async fn test_floor_applies_to_tiny_demand() {
        let mut model = MinMaxModel::new(2.0, 50.0);
        model.fit(&series(vec![0.5, 0.5, 0.5])).unwrap();
        let predictions = model
            .predict(1, NaiveDate::from_ymd_opt(2025, 1, 3).unwrap())
            .await
            .unwrap();
        assert_eq!(predictions[0].point, 2.0);
    }

    #[tokio::test]
    async fn test_zero_only_history_forecasts_zero() {
        let mut model = MinMaxModel::new(1.0, 5.0);
        model.fit(&series(vec![0.0; 30])).unwrap();
        let predictions = model
            .predict(2, NaiveDate::from_ymd_opt(2025, 1, 30).unwrap())
            .await
            .unwrap();
        assert!(predictions.iter().all(|p| p.point == 0.0));
    }
}
