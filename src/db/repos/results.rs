use async_trait::async_trait;
use uuid::Uuid;

use super::DateWindow;
use crate::{
    db::error::DbResult,
    models::{ActualObservation, ForecastResultRow},
};

/// A (forecast, actual) pair for quality scoring. `actual_value` is None
/// until backfilled.
#[derive(Debug, Clone)]
pub struct ScoredResult {
    pub point_forecast: f64,
    pub actual_value: Option<f64>,
}

#[async_trait]
pub trait ForecastResultRepo: Send + Sync {
    /// Append result rows in a single transaction. All-or-nothing: a failed
    /// commit leaves no partial rows visible.
    async fn append_results(&self, rows: &[ForecastResultRow]) -> DbResult<usize>;

    /// Rows for one run and method, ordered by (item_id, forecast_date).
    async fn list_by_run_and_method(
        &self,
        run_id: Uuid,
        method_id: &str,
    ) -> DbResult<Vec<ForecastResultRow>>;

    /// Overwrite `actual_value` on existing rows for the item. Idempotent;
    /// never creates rows. Returns the number of rows updated.
    async fn backfill_actuals(
        &self,
        item_id: &str,
        actuals: &[ActualObservation],
    ) -> DbResult<u64>;

    /// Every method with any result rows for the item in the window.
    /// Deliberately not run-scoped: restricting discovery to one run would
    /// hide historically valid method comparisons.
    async fn distinct_methods(&self, item_id: &str, window: DateWindow) -> DbResult<Vec<String>>;

    /// Scoring rows for one (item, method), optionally restricted to a run
    /// and date window, ordered by forecast_date.
    async fn scored_rows(
        &self,
        item_id: &str,
        method_id: &str,
        window: DateWindow,
        run_id: Option<Uuid>,
    ) -> DbResult<Vec<ScoredResult>>;
}
