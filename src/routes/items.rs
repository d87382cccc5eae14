//! Per-item read/write endpoints: actuals backfill and quality metrics.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::error::ApiError;
use crate::{
    AppState,
    db::DateWindow,
    models::{BackfillActualsRequest, BackfillActualsResponse, MethodQuality},
};

/// `POST /api/v1/items/{item_id}/actuals`
///
/// Idempotent overwrite of `actual_value` on existing result rows. Rows are
/// never created here; dates with no stored forecast are simply skipped.
#[tracing::instrument(name = "items.backfill_actuals", skip(state, request))]
pub async fn backfill_actuals(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(request): Json<BackfillActualsRequest>,
) -> Result<Json<BackfillActualsResponse>, ApiError> {
    request.validate()?;

    let updated_count = state
        .db
        .results()
        .backfill_actuals(&item_id, &request.actuals)
        .await?;

    Ok(Json(BackfillActualsResponse { updated_count }))
}

/// Query parameters for the quality endpoint.
#[derive(Debug, Deserialize)]
pub struct QualityQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub run_id: Option<Uuid>,
}

/// `GET /api/v1/items/{item_id}/quality`
///
/// Per-method quality over the item's scored window. An item with no
/// stored results yields an empty list.
#[tracing::instrument(name = "items.quality", skip(state))]
pub async fn get_quality(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Query(query): Query<QualityQuery>,
) -> Result<Json<Vec<MethodQuality>>, ApiError> {
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if end < start {
            return Err(ApiError::BadRequest(
                "end_date must be >= start_date".to_string(),
            ));
        }
    }

    let window = DateWindow::new(query.start_date, query.end_date);
    let report = state
        .services
        .quality
        .for_item(&item_id, window, query.run_id)
        .await?;

    Ok(Json(report))
}
