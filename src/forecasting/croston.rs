//! Croston's method and the Syntetos-Boylan Approximation.
//!
//! Both decompose an intermittent series into non-zero demand sizes and the
//! intervals between them, smooth each with simple exponential smoothing,
//! and forecast a flat per-day rate of smoothed_size / smoothed_interval.
//! SBA multiplies that rate by (1 - alpha/2) to correct Croston's known
//! positive bias.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{ForecastModel, ModelError, ModelFamily, flat_forecast, method};
use crate::models::{DailySeries, Prediction};

pub const DEFAULT_ALPHA: f64 = 0.1;

/// Smoothed demand rate for a series, or 0.0 when the history holds no
/// demand at all.
fn croston_rate(values: &[f64], alpha: f64) -> f64 {
    let mut smoothed_size: Option<f64> = None;
    let mut smoothed_interval: Option<f64> = None;
    let mut periods_since_demand = 0usize;

    for &value in values {
        periods_since_demand += 1;
        if value <= 0.0 {
            continue;
        }
        let interval = periods_since_demand as f64;
        periods_since_demand = 0;

        smoothed_size = Some(match smoothed_size {
            Some(size) => size + alpha * (value - size),
            None => value,
        });
        smoothed_interval = Some(match smoothed_interval {
            Some(gap) => gap + alpha * (interval - gap),
            None => interval,
        });
    }

    match (smoothed_size, smoothed_interval) {
        (Some(size), Some(interval)) if interval > 0.0 => size / interval,
        _ => 0.0,
    }
}

/// Croston's method for intermittent demand.
#[derive(Debug)]
pub struct CrostonModel {
    alpha: f64,
    rate: Option<f64>,
}

impl CrostonModel {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, rate: None }
    }
}

#[async_trait]
impl ForecastModel for CrostonModel {
    fn id(&self) -> &'static str {
        method::CROSTON
    }

    fn family(&self) -> ModelFamily {
        ModelFamily::StatisticalIntermittent
    }

    fn fit(&mut self, history: &DailySeries) -> Result<(), ModelError> {
        self.rate = Some(croston_rate(history.values(), self.alpha));
        Ok(())
    }

    async fn predict(
        &self,
        horizon_days: usize,
        training_end: NaiveDate,
    ) -> Result<Vec<Prediction>, ModelError> {
        let rate = self.rate.ok_or(ModelError::NotFitted)?;
        Ok(flat_forecast(rate, horizon_days, training_end))
    }
}

/// Syntetos-Boylan Approximation: Croston de-biased by (1 - alpha/2).
#[derive(Debug)]
pub struct SbaModel {
    alpha: f64,
    rate: Option<f64>,
}

impl SbaModel {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, rate: None }
    }
}

#[async_trait]
impl ForecastModel for SbaModel {
    fn id(&self) -> &'static str {
        method::SBA
    }

    fn family(&self) -> ModelFamily {
        ModelFamily::StatisticalIntermittent
    }

    fn fit(&mut self, history: &DailySeries) -> Result<(), ModelError> {
        let correction = 1.0 - self.alpha / 2.0;
        self.rate = Some(croston_rate(history.values(), self.alpha) * correction);
        Ok(())
    }

    async fn predict(
        &self,
        horizon_days: usize,
        training_end: NaiveDate,
    ) -> Result<Vec<Prediction>, ModelError> {
        let rate = self.rate.ok_or(ModelError::NotFitted)?;
        Ok(flat_forecast(rate, horizon_days, training_end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: Vec<f64>) -> DailySeries {
        DailySeries::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), values)
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_constant_demand_every_other_day() {
        // Sizes are all 4, intervals all 2: the smoothed rate is exactly 2.
        let values: Vec<f64> = (0..60).map(|i| if i % 2 == 1 { 4.0 } else { 0.0 }).collect();
        let rate = croston_rate(&values, DEFAULT_ALPHA);
        assert!((rate - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_only_history_rate_is_zero() {
        assert_eq!(croston_rate(&[0.0; 40], DEFAULT_ALPHA), 0.0);
    }

    #[test]
    fn test_smoothing_follows_size_shift() {
        // Demand size jumps from 2 to 10 halfway; the smoothed rate must sit
        // between the old and new steady-state rates.
        let mut values = Vec::new();
        for i in 0..100 {
            values.push(if i % 2 == 1 {
                if i < 50 { 2.0 } else { 10.0 }
            } else {
                0.0
            });
        }
        let rate = croston_rate(&values, DEFAULT_ALPHA);
        assert!(rate > 1.0 && rate < 5.0, "rate was {rate}");
    }

    #[tokio::test]
    async fn test_croston_forecast_is_flat() {
        let values: Vec<f64> = (0..90).map(|i| if i % 3 == 0 { 6.0 } else { 0.0 }).collect();
        let mut model = CrostonModel::new(DEFAULT_ALPHA);
        model.fit(&series(values)).unwrap();

        let predictions = model.predict(14, day("2025-03-31")).await.unwrap();
        assert_eq!(predictions.len(), 14);
        assert_eq!(predictions[0].date, day("2025-04-01"));
        let first = predictions[0].point;
        assert!(predictions.iter().all(|p| p.point == first));
        assert!(first > 0.0);
    }

    #[tokio::test]
    async fn test_sba_is_croston_scaled_down() {
        let values: Vec<f64> = (0..90).map(|i| if i % 3 == 0 { 6.0 } else { 0.0 }).collect();
        let history = series(values);

        let mut croston = CrostonModel::new(DEFAULT_ALPHA);
        croston.fit(&history).unwrap();
        let mut sba = SbaModel::new(DEFAULT_ALPHA);
        sba.fit(&history).unwrap();

        let end = day("2025-03-31");
        let croston_level = croston.predict(1, end).await.unwrap()[0].point;
        let sba_level = sba.predict(1, end).await.unwrap()[0].point;

        assert!((sba_level - croston_level * (1.0 - DEFAULT_ALPHA / 2.0)).abs() < 1e-12);
        assert!(sba_level < croston_level);
    }

    #[tokio::test]
    async fn test_predict_before_fit_is_an_error() {
        let model = CrostonModel::new(DEFAULT_ALPHA);
        let err = model.predict(3, day("2025-01-01")).await.unwrap_err();
        assert!(matches!(err, ModelError::NotFitted));
    }
}
