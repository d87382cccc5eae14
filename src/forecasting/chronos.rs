//! Chronos-2 foundation model adapter.
//!
//! The pretrained pipeline is large and expensive to own, so it runs behind
//! an inference endpoint and this module holds the one process-local handle
//! to it. Every call is a blocking suspension point from the orchestrator's
//! point of view. The adapter sends the target column only (covariates are
//! deliberately withheld), cast to f32 to match the pipeline's device
//! constraints, and reads the 0.1/0.5/0.9 quantile heads back. The point
//! forecast is the median.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use super::{ForecastModel, ModelError, ModelFamily, forecast_dates, method};
use crate::models::{DailySeries, Prediction, Quantiles};

/// Quantile levels requested from the pipeline, ascending.
const QUANTILE_LEVELS: [f64; 3] = [0.1, 0.5, 0.9];

static GLOBAL_PIPELINE: OnceCell<Arc<ChronosPipeline>> = OnceCell::new();

/// Handle to the Chronos-2 inference endpoint.
pub struct ChronosPipeline {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl ChronosPipeline {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        }
    }

    /// The process-local pipeline, initialized lazily on first use. Later
    /// callers get the same handle regardless of the arguments they pass.
    pub fn global(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Arc<Self> {
        GLOBAL_PIPELINE
            .get_or_init(|| Arc::new(Self::new(client, endpoint, timeout)))
            .clone()
    }

    /// Run one zero-shot forecast over the univariate context.
    pub async fn forecast(
        &self,
        context: &[f32],
        prediction_length: usize,
        quantile_levels: &[f64],
    ) -> Result<PipelineForecast, ModelError> {
        let body = ForecastRequestBody {
            context,
            prediction_length,
            quantile_levels,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Pipeline(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ModelError::Pipeline(format!(
                "pipeline returned {status}: {detail}"
            )));
        }

        let forecast: PipelineForecast = response
            .json()
            .await
            .map_err(|e| ModelError::Pipeline(format!("invalid response body: {e}")))?;

        if forecast.quantiles.len() != quantile_levels.len() {
            return Err(ModelError::Pipeline(format!(
                "expected {} quantile series, got {}",
                quantile_levels.len(),
                forecast.quantiles.len()
            )));
        }
        for (i, series) in forecast.quantiles.iter().enumerate() {
            if series.len() != prediction_length {
                return Err(ModelError::Pipeline(format!(
                    "quantile series {i} has {} values, expected {prediction_length}",
                    series.len()
                )));
            }
        }

        Ok(forecast)
    }
}

#[derive(Serialize)]
struct ForecastRequestBody<'a> {
    context: &'a [f32],
    prediction_length: usize,
    quantile_levels: &'a [f64],
}

/// Raw pipeline output: one series per requested quantile level, in the
/// order the levels were requested.
#[derive(Debug, Deserialize)]
pub struct PipelineForecast {
    pub quantiles: Vec<Vec<f64>>,
}

/// The foundation model as a registry method. `fit` only captures the
/// context; all the work happens in the pipeline at predict time.
pub struct Chronos2Model {
    pipeline: Arc<ChronosPipeline>,
    context: Option<Vec<f32>>,
}

impl Chronos2Model {
    pub fn new(pipeline: Arc<ChronosPipeline>) -> Self {
        Self {
            pipeline,
            context: None,
        }
    }
}

#[async_trait]
impl ForecastModel for Chronos2Model {
    fn id(&self) -> &'static str {
        method::CHRONOS2
    }

    fn family(&self) -> ModelFamily {
        ModelFamily::MlFoundation
    }

    fn produces_quantiles(&self) -> bool {
        true
    }

    fn fit(&mut self, history: &DailySeries) -> Result<(), ModelError> {
        // Target column only, cast down for float32 pipelines.
        self.context = Some(history.values().iter().map(|v| *v as f32).collect());
        Ok(())
    }

    async fn predict(
        &self,
        horizon_days: usize,
        training_end: NaiveDate,
    ) -> Result<Vec<Prediction>, ModelError> {
        let context = self.context.as_ref().ok_or(ModelError::NotFitted)?;

        let forecast = self
            .pipeline
            .forecast(context, horizon_days, &QUANTILE_LEVELS)
            .await?;

        let dates = forecast_dates(training_end, horizon_days);
        let predictions = dates
            .into_iter()
            .enumerate()
            .map(|(i, date)| {
                let p10 = forecast.quantiles[0][i];
                let p50 = forecast.quantiles[1][i];
                let p90 = forecast.quantiles[2][i];
                Prediction {
                    date,
                    point: p50,
                    quantiles: Some(Quantiles { p10, p50, p90 }),
                }
            })
            .collect();

        Ok(predictions)
    }
}
