use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::SkuClassification;

/// Lifecycle state of a forecast run. Terminal states are `Completed` and
/// `Failed`; a run fails only when every requested item failed (or the
/// commit itself did).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "completed" => Self::Completed,
            _ => Self::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Database model for a forecast run.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastRun {
    pub run_id: Uuid,
    pub client_id: String,
    /// None for system-generated runs (scheduled refresh, test bed).
    pub user_id: Option<Uuid>,
    pub status: RunStatus,
    pub primary_model: String,
    pub include_baseline: bool,
    pub run_all_methods: bool,
    pub prediction_length: i64,
    pub training_end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Parameters to open a new run record.
#[derive(Debug, Clone)]
pub struct CreateForecastRun {
    pub client_id: String,
    pub user_id: Option<Uuid>,
    pub primary_model: String,
    pub include_baseline: bool,
    pub run_all_methods: bool,
    pub prediction_length: i64,
    pub training_end_date: Option<NaiveDate>,
}

/// One stored forecast row. Unique per (run, item, method, date);
/// `actual_value` stays None until backfilled.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastResultRow {
    pub run_id: Uuid,
    pub item_id: String,
    pub method: String,
    pub forecast_date: NaiveDate,
    pub point_forecast: f64,
    pub p10: Option<f64>,
    pub p50: Option<f64>,
    pub p90: Option<f64>,
    pub actual_value: Option<f64>,
}

/// Raw model output for a single horizon day, before the engine clips
/// negatives and fills missing quantiles.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub date: NaiveDate,
    pub point: f64,
    pub quantiles: Option<Quantiles>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantiles {
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

/// Machine-readable kind for a per-item failure. One item failing never
/// aborts its siblings; the kind plus a human message is what callers see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemFailureKind {
    InsufficientHistory,
    InvalidSeries,
    UnknownMethod,
    ModelFitFailure,
    ModelPredictFailure,
    ModelTimeout,
    NotFound,
}

impl ItemFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientHistory => "INSUFFICIENT_HISTORY",
            Self::InvalidSeries => "INVALID_SERIES",
            Self::UnknownMethod => "UNKNOWN_METHOD",
            Self::ModelFitFailure => "MODEL_FIT_FAILURE",
            Self::ModelPredictFailure => "MODEL_PREDICT_FAILURE",
            Self::ModelTimeout => "MODEL_TIMEOUT",
            Self::NotFound => "NOT_FOUND",
        }
    }
}

// ==================== Request / response payloads ====================

fn default_true() -> bool {
    true
}

/// Request body for generating forecasts.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateForecastRequest {
    #[validate(length(min = 1, message = "item_ids must not be empty"))]
    pub item_ids: Vec<String>,
    #[validate(range(min = 1))]
    pub prediction_length: i64,
    pub primary_model: String,
    #[serde(default = "default_true")]
    pub include_baseline: bool,
    #[serde(default)]
    pub run_all_methods: bool,
    #[serde(default)]
    pub skip_persistence: bool,
    #[serde(default)]
    pub training_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

/// Response for a generate-forecast request. With `run_all_methods` the
/// `items` list holds one entry per (item, method).
#[derive(Debug, Serialize)]
pub struct GenerateForecastResponse {
    pub forecast_run_id: Uuid,
    pub status: RunStatus,
    pub items: Vec<ItemForecast>,
    pub failures: Vec<ItemFailure>,
}

#[derive(Debug, Serialize)]
pub struct ItemForecast {
    pub item_id: String,
    pub classification: SkuClassification,
    pub method_used: String,
    pub predictions: Vec<PredictionOut>,
}

#[derive(Debug, Serialize)]
pub struct PredictionOut {
    pub date: NaiveDate,
    pub point_forecast: f64,
    pub quantiles: QuantilesOut,
}

#[derive(Debug, Serialize)]
pub struct QuantilesOut {
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

#[derive(Debug, Serialize)]
pub struct ItemFailure {
    pub item_id: String,
    pub error: ItemFailureKind,
    pub message: String,
}

/// One observed actual, to be written onto an existing result row.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActualObservation {
    pub date: NaiveDate,
    pub actual_value: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BackfillActualsRequest {
    #[validate(length(min = 1, message = "actuals must not be empty"))]
    pub actuals: Vec<ActualObservation>,
}

#[derive(Debug, Serialize)]
pub struct BackfillActualsResponse {
    pub updated_count: u64,
}
