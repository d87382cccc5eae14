use serde::{Deserialize, Serialize};

use crate::models::NanPolicy;
use crate::validation::ValidatorOptions;

/// Forecasting engine configuration: validation defaults, per-method
/// parameters, and the foundation model endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastingConfig {
    /// Minimum history length accepted by the validator.
    #[serde(default = "default_min_history_days")]
    pub min_history_days: usize,

    /// Reindex series onto a continuous daily range before filling.
    #[serde(default = "default_true")]
    pub fill_missing_dates: bool,

    /// What to do with missing values after reindexing.
    #[serde(default)]
    pub nan_policy: NanPolicy,

    /// Smoothing constant shared by Croston and SBA.
    #[serde(default = "default_croston_alpha")]
    pub croston_alpha: f64,

    /// Clamp band for the Min/Max rule.
    #[serde(default)]
    pub min_max_floor: f64,
    #[serde(default = "default_min_max_ceiling")]
    pub min_max_ceiling: f64,

    /// Budget for one item's validate/classify/fit/predict sequence.
    /// Exceeding it fails the item, not the run.
    #[serde(default = "default_per_item_timeout_secs")]
    pub per_item_timeout_secs: u64,

    #[serde(default)]
    pub chronos: ChronosConfig,
}

impl ForecastingConfig {
    pub fn validator_options(&self) -> ValidatorOptions {
        ValidatorOptions {
            fill_missing_dates: self.fill_missing_dates,
            nan_policy: self.nan_policy,
            min_history_days: self.min_history_days,
        }
    }
}

impl Default for ForecastingConfig {
    fn default() -> Self {
        Self {
            min_history_days: default_min_history_days(),
            fill_missing_dates: true,
            nan_policy: NanPolicy::default(),
            croston_alpha: default_croston_alpha(),
            min_max_floor: 0.0,
            min_max_ceiling: default_min_max_ceiling(),
            per_item_timeout_secs: default_per_item_timeout_secs(),
            chronos: ChronosConfig::default(),
        }
    }
}

/// Chronos-2 inference endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChronosConfig {
    /// Full URL of the forecast endpoint.
    #[serde(default = "default_chronos_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_chronos_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ChronosConfig {
    fn default() -> Self {
        Self {
            endpoint: default_chronos_endpoint(),
            timeout_secs: default_chronos_timeout_secs(),
        }
    }
}

fn default_min_history_days() -> usize {
    30
}

fn default_croston_alpha() -> f64 {
    0.1
}

fn default_min_max_ceiling() -> f64 {
    10_000.0
}

fn default_per_item_timeout_secs() -> u64 {
    60
}

fn default_chronos_endpoint() -> String {
    "http://127.0.0.1:8500/v1/forecast".to_string()
}

fn default_chronos_timeout_secs() -> u64 {
    120
}

fn default_true() -> bool {
    true
}
