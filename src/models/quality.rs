use serde::Serialize;

/// Forecast quality scores for one method over one item's scored window.
///
/// `mape` is None when no pair had a strictly positive actual (MAPE is
/// undefined at zero); the remaining metrics are None only when no scored
/// pairs exist at all.
#[derive(Debug, Clone, Serialize)]
pub struct MethodQuality {
    pub method: String,
    pub predictions_count: i64,
    pub actuals_count: i64,
    pub mape: Option<f64>,
    pub mae: Option<f64>,
    pub rmse: Option<f64>,
    pub bias: Option<f64>,
}
