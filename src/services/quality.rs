//! Forecast quality scoring.
//!
//! Read-path component: given stored predictions and backfilled actuals,
//! compute MAPE/MAE/RMSE/bias per method. Zero actuals are excluded from
//! MAPE (undefined there) but included in everything else, which is the
//! only behavior that scores intermittent demand fairly.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{DateWindow, DbPool, DbResult, ScoredResult},
    models::MethodQuality,
};

#[derive(Clone)]
pub struct QualityService {
    db: Arc<DbPool>,
}

impl QualityService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Per-method quality for one item.
    ///
    /// Method discovery spans every run that ever produced rows for the
    /// item in the window; `run_id`, when given, restricts only the scored
    /// rows. Scoping discovery to the run would hide historically valid
    /// comparisons.
    #[tracing::instrument(name = "quality.for_item", skip(self))]
    pub async fn for_item(
        &self,
        item_id: &str,
        window: DateWindow,
        run_id: Option<Uuid>,
    ) -> DbResult<Vec<MethodQuality>> {
        let methods = self.db.results().distinct_methods(item_id, window).await?;

        let mut report = Vec::with_capacity(methods.len());
        for method in methods {
            let rows = self
                .db
                .results()
                .scored_rows(item_id, &method, window, run_id)
                .await?;
            report.push(compute_method_quality(method, &rows));
        }
        Ok(report)
    }
}

/// Single pass over scored rows for one method.
fn compute_method_quality(method: String, rows: &[ScoredResult]) -> MethodQuality {
    let predictions_count = rows.len() as i64;

    let pairs: Vec<(f64, f64)> = rows
        .iter()
        .filter_map(|row| row.actual_value.map(|actual| (row.point_forecast, actual)))
        .collect();
    let actuals_count = pairs.len() as i64;

    if pairs.is_empty() {
        return MethodQuality {
            method,
            predictions_count,
            actuals_count,
            mape: None,
            mae: None,
            rmse: None,
            bias: None,
        };
    }

    let n = pairs.len() as f64;
    let mut abs_error_sum = 0.0;
    let mut squared_error_sum = 0.0;
    let mut signed_error_sum = 0.0;
    let mut pct_error_sum = 0.0;
    let mut positive_actuals = 0usize;

    for (forecast, actual) in &pairs {
        let error = actual - forecast;
        abs_error_sum += error.abs();
        squared_error_sum += error * error;
        signed_error_sum += forecast - actual;
        if *actual > 0.0 {
            pct_error_sum += error.abs() / actual;
            positive_actuals += 1;
        }
    }

    let mape = if positive_actuals > 0 {
        Some(100.0 * pct_error_sum / positive_actuals as f64)
    } else {
        None
    };

    MethodQuality {
        method,
        predictions_count,
        actuals_count,
        mape,
        mae: Some(abs_error_sum / n),
        rmse: Some((squared_error_sum / n).sqrt()),
        bias: Some(signed_error_sum / n),
    }
}
