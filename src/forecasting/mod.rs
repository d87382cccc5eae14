//! Forecasting methods and the registry that routes between them.
//!
//! Each method is a value implementing the [`ForecastModel`] contract, not a
//! node in an inheritance hierarchy: the registry constructs them by id and
//! the router decides which ids run for a given request. Numerical semantics
//! differ radically between families (a foundation transformer, intermittent
//! statistics, naive baselines), so the shared contract is intentionally
//! small: `fit` on the validated history, `predict` over a horizon.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::models::{DailySeries, Prediction, Quantiles};

pub mod chronos;
mod croston;
mod min_max;
mod moving_average;
mod registry;

pub use chronos::{Chronos2Model, ChronosPipeline};
pub use croston::{CrostonModel, SbaModel};
pub use min_max::MinMaxModel;
pub use moving_average::MovingAverageModel;
pub use registry::{MethodPlan, ModelInfo, ModelRegistry};

/// Registered method identifiers. `ALL` fixes the stable order used when a
/// request asks for every method.
pub mod method {
    pub const CHRONOS2: &str = "chronos-2";
    pub const MA7: &str = "statistical_ma7";
    pub const SBA: &str = "sba";
    pub const CROSTON: &str = "croston";
    pub const MIN_MAX: &str = "min_max";

    pub const ALL: [&str; 5] = [CHRONOS2, MA7, SBA, CROSTON, MIN_MAX];
}

/// Which algorithm family a method belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    MlFoundation,
    StatisticalIntermittent,
    StatisticalSimple,
    RuleBased,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model has not been fitted")]
    NotFitted,

    #[error("insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("pipeline error: {0}")]
    Pipeline(String),

    #[error("prediction error: {0}")]
    Predict(String),
}

/// Shared contract for every forecasting method.
///
/// Models consume the target column only; covariates never cross this
/// boundary. Instances move `uninitialized -> fitted` via [`fit`]; calling
/// [`predict`] first is a [`ModelError::NotFitted`].
///
/// [`fit`]: ForecastModel::fit
/// [`predict`]: ForecastModel::predict
#[async_trait]
pub trait ForecastModel: Send + Sync {
    fn id(&self) -> &'static str;

    fn family(&self) -> ModelFamily;

    /// Whether predictions carry genuine quantiles (as opposed to the
    /// engine copying the point forecast into p10/p50/p90).
    fn produces_quantiles(&self) -> bool {
        false
    }

    fn fit(&mut self, history: &DailySeries) -> Result<(), ModelError>;

    /// Forecast `horizon_days` consecutive days starting the day after
    /// `training_end`. Treated as a suspension point: the foundation model
    /// blocks on its pipeline, the statistical methods return immediately.
    async fn predict(
        &self,
        horizon_days: usize,
        training_end: NaiveDate,
    ) -> Result<Vec<Prediction>, ModelError>;
}

/// The consecutive forecast dates for a horizon: training_end + 1 onwards.
pub fn forecast_dates(training_end: NaiveDate, horizon_days: usize) -> Vec<NaiveDate> {
    (1..=horizon_days as i64)
        .map(|offset| training_end + Duration::days(offset))
        .collect()
}

/// Build a flat forecast (the shape every statistical method here emits).
pub(crate) fn flat_forecast(
    level: f64,
    horizon_days: usize,
    training_end: NaiveDate,
) -> Vec<Prediction> {
    forecast_dates(training_end, horizon_days)
        .into_iter()
        .map(|date| Prediction {
            date,
            point: level,
            quantiles: None,
        })
        .collect()
}

/// A prediction after engine-side post-processing: non-negative, with a
/// full, ordered quantile triple.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedPrediction {
    pub date: NaiveDate,
    pub point: f64,
    pub quantiles: Quantiles,
}

/// Engine-side post-processing applied to every model's raw output:
/// clip negatives to zero, fill absent quantiles from the point forecast,
/// and re-order any quantile triple a model returned out of order.
pub fn sanitize_predictions(predictions: Vec<Prediction>) -> Vec<FinalizedPrediction> {
    predictions
        .into_iter()
        .map(|prediction| {
            let point = prediction.point.max(0.0);
            let quantiles = match prediction.quantiles {
                Some(q) => {
                    let mut sorted = [q.p10.max(0.0), q.p50.max(0.0), q.p90.max(0.0)];
                    sorted.sort_by(|a, b| a.total_cmp(b));
                    Quantiles {
                        p10: sorted[0],
                        p50: sorted[1],
                        p90: sorted[2],
                    }
                }
                None => Quantiles {
                    p10: point,
                    p50: point,
                    p90: point,
                },
            };
            FinalizedPrediction {
                date: prediction.date,
                point,
                quantiles,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_forecast_dates_start_after_training_end() {
        let dates = forecast_dates(day("2025-06-30"), 3);
        assert_eq!(
            dates,
            vec![day("2025-07-01"), day("2025-07-02"), day("2025-07-03")]
        );
    }

    #[test]
    fn test_sanitize_clips_negatives_and_fills_quantiles() {
        let raw = vec![Prediction {
            date: day("2025-07-01"),
            point: -2.5,
            quantiles: None,
        }];
        let sanitized = sanitize_predictions(raw);
        assert_eq!(sanitized[0].point, 0.0);
        let q = sanitized[0].quantiles;
        assert_eq!((q.p10, q.p50, q.p90), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_sanitize_reorders_quantiles() {
        let raw = vec![Prediction {
            date: day("2025-07-01"),
            point: 5.0,
            quantiles: Some(Quantiles {
                p10: 8.0,
                p50: 4.0,
                p90: -1.0,
            }),
        }];
        let q = sanitize_predictions(raw)[0].quantiles;
        assert!(q.p10 <= q.p50 && q.p50 <= q.p90);
        assert_eq!(q.p10, 0.0);
    }
}
